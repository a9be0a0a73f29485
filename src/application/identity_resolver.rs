use std::sync::Arc;

use crate::domain::entities::{PullRequestRef, RosterEntry};
use crate::domain::ports::{ChatGateway, SourceControlGateway};

/// Maps source-control logins to chat identities.
///
/// The static roster always wins: a roster hit performs zero network calls.
/// Otherwise the login's profile email is looked up on the chat side; a
/// profile without an email ends resolution, there is no further fallback.
pub struct IdentityResolver {
    roster: Vec<RosterEntry>,
    source_control: Arc<dyn SourceControlGateway>,
    chat: Arc<dyn ChatGateway>,
}

impl IdentityResolver {
    pub fn new(
        roster: Vec<RosterEntry>,
        source_control: Arc<dyn SourceControlGateway>,
        chat: Arc<dyn ChatGateway>,
    ) -> Self {
        Self {
            roster,
            source_control,
            chat,
        }
    }

    pub async fn find_chat_id_for(&self, login: &str) -> Option<String> {
        if let Some(entry) = self
            .roster
            .iter()
            .find(|entry| entry.github_login == login)
        {
            return Some(entry.slack_id.clone());
        }

        let profile = self.source_control.get_user(login).await?;
        let email = match profile.email {
            Some(email) => email,
            None => {
                tracing::debug!(login, "profile has no public email, cannot resolve chat id");
                return None;
            }
        };
        let user = self.chat.lookup_user_by_email(&email).await?;
        Some(user.id)
    }

    /// Resolves the author of each pull request into a chat id, preserving
    /// the order the pull requests were supplied in. Each login is attempted
    /// at most once per call; logins that cannot be resolved are dropped from
    /// the result rather than failing the whole mapping.
    pub async fn extract_logins_with_chat_ids(
        &self,
        pull_requests: &[PullRequestRef],
    ) -> Vec<(String, String)> {
        let mut attempted: Vec<&str> = Vec::new();
        let mut resolved = Vec::new();

        for pull_request in pull_requests {
            let login = match &pull_request.user {
                Some(author) => author.login.as_str(),
                None => continue,
            };
            if attempted.contains(&login) {
                continue;
            }
            attempted.push(login);

            if let Some(chat_id) = self.find_chat_id_for(login).await {
                resolved.push((login.to_string(), chat_id));
            }
        }

        resolved
    }
}
