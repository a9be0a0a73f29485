use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::{
    Commit, DeploymentRecord, DeploymentStatusState, PullRequestRef, RepositoryRef, StatusRecord,
    UserProfile, WorkflowRun,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::SourceControlGateway;
use crate::infrastructure::cache::MemoryCache;

/// Login of the automation account whose commits should never be resolved to
/// a human; excluded before any network call.
const AUTOMATION_BOT_LOGIN: &str = "github-actions[bot]";

pub struct OctocrabSourceControlGateway {
    client: octocrab::Octocrab,
    users: MemoryCache<UserProfile>,
}

impl OctocrabSourceControlGateway {
    pub fn new(client: octocrab::Octocrab, users: MemoryCache<UserProfile>) -> Self {
        Self { client, users }
    }

    pub fn build_client(token: String, base_uri: Option<&str>) -> anyhow::Result<octocrab::Octocrab> {
        let mut builder = octocrab::Octocrab::builder().personal_token(token);
        if let Some(uri) = base_uri {
            builder = builder.base_uri(uri)?;
        }
        Ok(builder.build()?)
    }
}

fn remote_status(err: &octocrab::Error) -> Option<u16> {
    match err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

#[async_trait]
impl SourceControlGateway for OctocrabSourceControlGateway {
    async fn get_user(&self, login: &str) -> Option<UserProfile> {
        if login == AUTOMATION_BOT_LOGIN {
            return None;
        }
        if let Some(hit) = self.users.get(login).await {
            return Some(hit);
        }

        let route = format!("/users/{login}");
        let result: octocrab::Result<UserProfile> = self.client.get(route, None::<&()>).await;
        match result {
            Ok(profile) => {
                self.users.insert(login, profile.clone()).await;
                Some(profile)
            }
            Err(err) => {
                tracing::warn!(login, error = %err, "github user lookup failed");
                None
            }
        }
    }

    async fn get_repository(&self, full_name: &str) -> Option<RepositoryRef> {
        #[derive(Debug, Deserialize)]
        struct RepoDto {
            full_name: String,
        }

        let route = format!("/repos/{full_name}");
        let result: octocrab::Result<RepoDto> = self.client.get(route, None::<&()>).await;
        match result {
            Ok(repo) => RepositoryRef::parse(&repo.full_name).ok(),
            Err(err) if remote_status(&err) == Some(404) => {
                tracing::debug!(full_name, "github repository not found");
                None
            }
            Err(err) => {
                tracing::error!(full_name, error = %err, "github repository lookup failed");
                None
            }
        }
    }

    async fn get_commit(&self, full_name: &str, sha: &str) -> Option<Commit> {
        #[derive(Debug, Deserialize)]
        struct CommitDto {
            sha: String,
            #[serde(default)]
            html_url: Option<String>,
            #[serde(default)]
            commit: Option<CommitDetailDto>,
        }
        #[derive(Debug, Deserialize)]
        struct CommitDetailDto {
            #[serde(default)]
            message: Option<String>,
        }

        let route = format!("/repos/{full_name}/commits/{sha}");
        let result: octocrab::Result<CommitDto> = self.client.get(route, None::<&()>).await;
        match result {
            Ok(dto) => Some(Commit {
                sha: dto.sha,
                message: dto.commit.and_then(|c| c.message),
                html_url: dto.html_url,
            }),
            Err(err) if remote_status(&err) == Some(404) => {
                tracing::debug!(full_name, sha, "github commit not found");
                None
            }
            Err(err) => {
                tracing::error!(full_name, sha, error = %err, "github commit lookup failed");
                None
            }
        }
    }

    async fn get_latest_deployment(
        &self,
        repo: &RepositoryRef,
        environment: &str,
        sha: &str,
    ) -> Option<DeploymentRecord> {
        #[derive(Debug, Serialize)]
        struct ListParams<'a> {
            environment: &'a str,
            sha: &'a str,
            per_page: u8,
        }

        let route = format!("/repos/{}/{}/deployments", repo.owner, repo.name);
        let params = ListParams {
            environment,
            sha,
            per_page: 1,
        };
        let result: octocrab::Result<Vec<DeploymentRecord>> =
            self.client.get(route, Some(&params)).await;
        match result {
            Ok(deployments) => deployments.into_iter().next(),
            Err(err) => {
                tracing::warn!(repo = %repo, environment, sha, error = %err, "deployment list failed");
                None
            }
        }
    }

    async fn set_deployment_status(
        &self,
        repo: &RepositoryRef,
        deployment_id: u64,
        state: DeploymentStatusState,
    ) -> Option<StatusRecord> {
        let route = format!(
            "/repos/{}/{}/deployments/{deployment_id}/statuses",
            repo.owner, repo.name
        );
        let payload = serde_json::json!({ "state": state });
        let result: octocrab::Result<StatusRecord> = self.client.post(route, Some(&payload)).await;
        match result {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(
                    repo = %repo,
                    deployment_id,
                    state = %state,
                    error = %err,
                    "deployment status update rejected"
                );
                None
            }
        }
    }

    async fn invoke_workflow_dispatch(
        &self,
        repo: &RepositoryRef,
        git_ref: &str,
        workflow_name: &str,
        inputs: Value,
    ) {
        let result = self
            .client
            .actions()
            .create_workflow_dispatch(
                repo.owner.as_str(),
                repo.name.as_str(),
                workflow_name,
                git_ref,
            )
            .inputs(inputs)
            .send()
            .await;
        if let Err(err) = result {
            tracing::warn!(repo = %repo, workflow_name, git_ref, error = %err, "workflow dispatch failed");
        }
    }

    async fn list_pull_requests_for_commit(
        &self,
        repo: &RepositoryRef,
        sha: &str,
    ) -> Option<Vec<PullRequestRef>> {
        let route = format!("/repos/{}/{}/commits/{sha}/pulls", repo.owner, repo.name);
        let result: octocrab::Result<Vec<PullRequestRef>> =
            self.client.get(route, None::<&()>).await;
        match result {
            Ok(pulls) => Some(pulls),
            Err(err) => {
                tracing::warn!(repo = %repo, sha, error = %err, "pull request list failed");
                None
            }
        }
    }

    async fn determine_workflow_run_for_commit(
        &self,
        repo: &RepositoryRef,
        workflow_name: &str,
        sha: &str,
    ) -> Result<Option<WorkflowRun>, DomainError> {
        if repo.owner.is_empty() || repo.name.is_empty() {
            return Err(DomainError::MissingArgument("repository"));
        }
        if workflow_name.is_empty() {
            return Err(DomainError::MissingArgument("workflow_name"));
        }
        if sha.is_empty() {
            return Err(DomainError::MissingArgument("sha"));
        }

        #[derive(Debug, Serialize)]
        struct RunsParams<'a> {
            event: &'a str,
            head_sha: &'a str,
        }
        #[derive(Debug, Deserialize)]
        struct RunsPage {
            #[serde(default)]
            workflow_runs: Vec<WorkflowRun>,
        }

        let route = format!(
            "/repos/{}/{}/actions/workflows/{workflow_name}/runs",
            repo.owner, repo.name
        );
        let params = RunsParams {
            event: "push",
            head_sha: sha,
        };
        let result: octocrab::Result<RunsPage> = self.client.get(route, Some(&params)).await;
        match result {
            // The API already filtered by head SHA; re-check so a stale index
            // cannot hand back a run for a different commit.
            Ok(page) => Ok(page.workflow_runs.into_iter().find(|run| run.head_sha == sha)),
            Err(err) => {
                tracing::warn!(repo = %repo, workflow_name, sha, error = %err, "workflow run lookup failed");
                Ok(None)
            }
        }
    }
}
