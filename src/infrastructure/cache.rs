use std::collections::HashMap;

use tokio::sync::Mutex;

/// Append-only in-memory cache keyed by a stable natural key (login, email).
///
/// No eviction and no refresh: a populated key stays for the process
/// lifetime. Writers racing on the same key store equivalent values, so the
/// last write winning is harmless.
#[derive(Debug, Default)]
pub struct MemoryCache<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V: Clone> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries.lock().await.get(key).cloned()
    }

    pub async fn insert(&self, key: impl Into<String>, value: V) {
        self.entries.lock().await.insert(key.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryCache;

    #[tokio::test]
    async fn stores_and_returns_clones() {
        let cache = MemoryCache::new();
        assert!(cache.get("octocat").await.is_none());

        cache.insert("octocat", "U123".to_string()).await;
        assert_eq!(cache.get("octocat").await.as_deref(), Some("U123"));
    }

    #[tokio::test]
    async fn last_writer_wins_on_same_key() {
        let cache = MemoryCache::new();
        cache.insert("octocat", "U123".to_string()).await;
        cache.insert("octocat", "U456".to_string()).await;
        assert_eq!(cache.get("octocat").await.as_deref(), Some("U456"));
    }
}
