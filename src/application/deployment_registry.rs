use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{DeploymentEntry, GithubSection};
use crate::domain::ports::SourceControlGateway;

/// Resolves a deployment name to repository coordinates.
///
/// Results are never cached: the config map is already in memory, and a
/// repository that failed a remote lookup may exist on the next request.
pub struct DeploymentRegistry {
    config: HashMap<String, DeploymentEntry>,
    organization: String,
    source_control: Arc<dyn SourceControlGateway>,
}

impl DeploymentRegistry {
    pub fn new(
        config: HashMap<String, DeploymentEntry>,
        organization: impl Into<String>,
        source_control: Arc<dyn SourceControlGateway>,
    ) -> Self {
        Self {
            config,
            organization: organization.into(),
            source_control,
        }
    }

    pub async fn lookup_deployment(&self, name: &str) -> Option<DeploymentEntry> {
        let configured = self.config.get(name);
        if let Some(entry) = configured {
            if entry.repository().is_some() {
                return Some(entry.clone());
            }
        }

        let conventional = format!("{}/{}", self.organization, name);
        let discovered = match self.source_control.get_repository(&conventional).await {
            Some(repo) => repo,
            None => {
                tracing::debug!(name, conventional, "deployment is not mapped to a repository");
                return None;
            }
        };

        let mut merged = configured.cloned().unwrap_or_default();
        let github = merged.github.get_or_insert_with(GithubSection::default);
        if github.repository.is_none() {
            github.repository = Some(discovered.full_name());
        }
        Some(merged)
    }
}
