use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entities::{
    ChatUser, Commit, ConversationOpening, DeploymentRecord, DeploymentStatusState, HistoryPage,
    PostResult, PullRequestRef, RepositoryRef, StatusRecord, UserProfile, WorkflowRun,
};
use crate::domain::errors::DomainError;

/// Capability wrapper around the source-control hosting API.
///
/// Every operation degrades to `None` on remote failure; errors never cross
/// this boundary. The one exception is
/// [`determine_workflow_run_for_commit`](SourceControlGateway::determine_workflow_run_for_commit),
/// which rejects missing identifiers as a caller bug.
#[async_trait]
pub trait SourceControlGateway: Send + Sync {
    /// Fetch a user profile by login, cache-first. Returns `None` for the
    /// well-known automation bot without touching the network.
    async fn get_user(&self, login: &str) -> Option<UserProfile>;

    async fn get_repository(&self, full_name: &str) -> Option<RepositoryRef>;

    async fn get_commit(&self, full_name: &str, sha: &str) -> Option<Commit>;

    /// Most recent deployment for an environment and commit, if any.
    async fn get_latest_deployment(
        &self,
        repo: &RepositoryRef,
        environment: &str,
        sha: &str,
    ) -> Option<DeploymentRecord>;

    async fn set_deployment_status(
        &self,
        repo: &RepositoryRef,
        deployment_id: u64,
        state: DeploymentStatusState,
    ) -> Option<StatusRecord>;

    /// Fire-and-forget workflow dispatch; failures are logged, never returned.
    async fn invoke_workflow_dispatch(
        &self,
        repo: &RepositoryRef,
        git_ref: &str,
        workflow_name: &str,
        inputs: Value,
    );

    /// The raw upstream list, merged or not.
    async fn list_pull_requests_for_commit(
        &self,
        repo: &RepositoryRef,
        sha: &str,
    ) -> Option<Vec<PullRequestRef>>;

    /// Push-event workflow run whose head SHA matches `sha` exactly.
    async fn determine_workflow_run_for_commit(
        &self,
        repo: &RepositoryRef,
        workflow_name: &str,
        sha: &str,
    ) -> Result<Option<WorkflowRun>, DomainError>;
}

/// Capability wrapper around the chat platform API.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Cache-first email lookup. Failures are not cached, so a transient
    /// outage can be retried by a later call with the same email.
    async fn lookup_user_by_email(&self, email: &str) -> Option<ChatUser>;

    /// Post to a channel. With a non-empty `thread_search_string`, a matching
    /// prior message is located first and the post threads onto it.
    async fn post_message(
        &self,
        channel_id: &str,
        content: &str,
        thread_search_string: Option<&str>,
        thread_reply_broadcast: bool,
    ) -> Option<PostResult>;

    async fn open_conversation(&self, user_id: &str) -> Option<ConversationOpening>;

    async fn send_direct_message(
        &self,
        user_id: &str,
        content: &str,
        thread_search_string: Option<&str>,
        thread_reply_broadcast: bool,
    ) -> Option<PostResult>;

    async fn conversations_history(
        &self,
        channel_id: &str,
        limit: u32,
        cursor: &str,
    ) -> Option<HistoryPage>;
}

/// Extension point for event-type-specific handlers. The intake hands the
/// parsed webhook body here and forwards the returned status code verbatim.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn classify_and_dispatch(&self, body: &Value) -> u16;
}

pub trait TokenProvider: Send + Sync {
    fn source_name(&self) -> &'static str;
    fn token(&self) -> Result<Option<String>>;
}

pub trait TokenWriter: Send + Sync {
    fn save_token(&self, token: &str) -> Result<()>;
}
