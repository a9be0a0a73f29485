use anyhow::{bail, Result};

use crate::domain::ports::{TokenProvider, TokenWriter};

#[derive(Debug, Clone)]
pub struct TokenResolution {
    pub source: &'static str,
    pub token: String,
}

/// Resolves a bearer token from an ordered provider chain; the first provider
/// that yields a token wins.
pub struct AuthManager<'a> {
    providers: Vec<&'a dyn TokenProvider>,
    stored: &'a dyn TokenWriter,
}

impl<'a> AuthManager<'a> {
    pub fn new(providers: Vec<&'a dyn TokenProvider>, stored: &'a dyn TokenWriter) -> Self {
        Self { providers, stored }
    }

    pub fn resolve_token(&self) -> Result<Option<TokenResolution>> {
        for provider in &self.providers {
            if let Some(token) = provider.token()? {
                return Ok(Some(TokenResolution {
                    source: provider.source_name(),
                    token,
                }));
            }
        }
        Ok(None)
    }

    pub fn login(&self, token: &str) -> Result<()> {
        let cleaned = token.trim();
        if cleaned.is_empty() {
            bail!("token cannot be empty");
        }
        self.stored.save_token(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct FixedProvider {
        name: &'static str,
        value: Option<&'static str>,
    }

    impl TokenProvider for FixedProvider {
        fn source_name(&self) -> &'static str {
            self.name
        }

        fn token(&self) -> Result<Option<String>> {
            Ok(self.value.map(str::to_string))
        }
    }

    #[derive(Default)]
    struct RecordingWriter {
        saved: Mutex<Option<String>>,
    }

    impl TokenWriter for RecordingWriter {
        fn save_token(&self, token: &str) -> Result<()> {
            *self.saved.lock().unwrap() = Some(token.to_string());
            Ok(())
        }
    }

    #[test]
    fn first_provider_with_a_token_wins() {
        let empty = FixedProvider {
            name: "GITHUB_TOKEN",
            value: None,
        };
        let stored = FixedProvider {
            name: "stored token",
            value: Some("ghp_stored"),
        };
        let writer = RecordingWriter::default();
        let manager = AuthManager::new(vec![&empty, &stored], &writer);

        let resolution = manager.resolve_token().expect("resolve").expect("token");
        assert_eq!(resolution.source, "stored token");
        assert_eq!(resolution.token, "ghp_stored");
    }

    #[test]
    fn no_providers_yield_none() {
        let empty = FixedProvider {
            name: "GITHUB_TOKEN",
            value: None,
        };
        let writer = RecordingWriter::default();
        let manager = AuthManager::new(vec![&empty], &writer);
        assert!(manager.resolve_token().expect("resolve").is_none());
    }

    #[test]
    fn login_trims_and_rejects_empty_tokens() {
        let writer = RecordingWriter::default();
        let manager = AuthManager::new(vec![], &writer);

        assert!(manager.login("   ").is_err());
        manager.login("  xoxb-123  ").expect("login");
        assert_eq!(writer.saved.lock().unwrap().as_deref(), Some("xoxb-123"));
    }
}
