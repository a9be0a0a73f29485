use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::{Context, Result};

use crate::domain::entities::DeploymentEntry;

/// Loads the static deployment-name → configuration map. The file is read
/// once at startup; the bridge never writes it back.
#[derive(Debug, Clone)]
pub struct DeploymentConfigAdapter {
    path: PathBuf,
}

impl DeploymentConfigAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<HashMap<String, DeploymentEntry>> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let entries: HashMap<String, DeploymentEntry> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid deployment config: {}", self.path.display()))?;
        Ok(entries)
    }
}

/// Token files live under the platform config directory, next to nothing else
/// of ours; the directory is created lazily on first save.
pub fn stored_token_path(name: &str) -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("herald")
        .join(name)
}
