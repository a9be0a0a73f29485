use std::{env, fs, path::PathBuf};

use anyhow::{Context, Result};

use crate::domain::ports::{TokenProvider, TokenWriter};

/// Reads a bearer token from a named environment variable.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: &'static str,
}

impl EnvTokenProvider {
    pub fn new(var: &'static str) -> Self {
        Self { var }
    }
}

impl TokenProvider for EnvTokenProvider {
    fn source_name(&self) -> &'static str {
        self.var
    }

    fn token(&self) -> Result<Option<String>> {
        Ok(env::var(self.var).ok().filter(|v| !v.trim().is_empty()))
    }
}

/// Reads and writes a token file under the local config directory.
#[derive(Debug, Clone)]
pub struct StoredTokenProvider {
    path: PathBuf,
}

impl StoredTokenProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenProvider for StoredTokenProvider {
    fn source_name(&self) -> &'static str {
        "stored token"
    }

    fn token(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let token = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let token = token.trim().to_string();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token))
        }
    }
}

impl TokenWriter for StoredTokenProvider {
    fn save_token(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir: {}", parent.display()))?;
        }
        fs::write(&self.path, token.trim())
            .with_context(|| format!("failed to save token to {}", self.path.display()))
    }
}
