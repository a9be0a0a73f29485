use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::errors::DomainError;

/// Resolved identity of a source-control repository, serialized as
/// `"owner/name"` everywhere it crosses a boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn parse(full_name: &str) -> Result<Self, DomainError> {
        let (owner, name) = full_name
            .split_once('/')
            .ok_or_else(|| DomainError::InvalidRepoFormat(full_name.to_string()))?;
        if owner.trim().is_empty() || name.trim().is_empty() {
            return Err(DomainError::InvalidRepoFormat(full_name.to_string()));
        }
        Ok(Self {
            owner: owner.trim().to_string(),
            name: name.trim().to_string(),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One deployment's static configuration. Unknown fields are carried through
/// untouched so operators can keep handler-specific settings in the same file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeploymentEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubSection>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeploymentEntry {
    pub fn repository(&self) -> Option<&str> {
        self.github.as_ref()?.repository.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GithubSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

/// A row of the login-to-chat-identity roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub github_login: String,
    pub slack_id: String,
}

/// GitHub user profile, cached by login for the process lifetime.
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub login: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Slack user, cached by email for the process lifetime.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ChatUser {
    pub id: String,
    pub email: String,
}

/// A message from channel history. Transient: every thread lookup re-fetches.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl ChatMessage {
    /// Timestamp replies should attach to: the root of the thread this message
    /// belongs to, or the message itself when it is the root.
    pub fn thread_root_ts(&self) -> &str {
        self.thread_ts.as_deref().unwrap_or(&self.ts)
    }
}

/// One page of channel history, most-recent-first as the API returns it.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub messages: Vec<ChatMessage>,
    pub next_cursor: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct PostResult {
    pub ok: bool,
    pub channel: Option<String>,
    pub ts: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConversationOpening {
    pub id: String,
}

/// A pull request associated with a commit; consumed only to extract the
/// author login.
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestRef {
    pub id: u64,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub user: Option<PullRequestAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestAuthor {
    pub login: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Commit {
    pub sha: String,
    pub message: Option<String>,
    pub html_url: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentRecord {
    pub id: u64,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatusState {
    Error,
    Failure,
    Inactive,
    InProgress,
    Queued,
    Pending,
    Success,
}

impl fmt::Display for DeploymentStatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Error => "error",
            Self::Failure => "failure",
            Self::Inactive => "inactive",
            Self::InProgress => "in_progress",
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Success => "success",
        };
        f.write_str(label)
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRecord {
    pub id: u64,
    pub state: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub head_sha: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Lenient typed view of an inbound webhook body. Every field is optional;
/// the dispatcher decides what a given notifier actually sent.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeploymentNotification {
    #[serde(default)]
    pub deployment: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
}

impl DeploymentNotification {
    pub fn from_value(body: &Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_default()
    }
}
