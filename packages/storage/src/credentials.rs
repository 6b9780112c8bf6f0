// ABOUTME: Persisted API credential access
// ABOUTME: Environment variable override, stored key fallback; never logged

use crate::error::Result;
use crate::kv::KeyValueStore;
use std::sync::Arc;

/// Fixed storage key for the Gemini API credential.
pub const API_KEY_KEY: &str = "geminiApiKey";

/// Environment variable that overrides the stored credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Reads and writes the API credential through a [`KeyValueStore`].
///
/// The credential's lifecycle is owned by the orchestration layer; a
/// missing key is reported as `None` here and becomes a configuration
/// failure at the first generation attempt. The key value is never logged.
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the configured API key, preferring the environment variable
    /// over the stored value. Blank values count as absent.
    pub async fn api_key(&self) -> Result<Option<String>> {
        if let Some(value) = Self::env_api_key() {
            return Ok(Some(value));
        }
        self.stored_api_key().await
    }

    /// The credential from the environment, if any.
    pub fn env_api_key() -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    /// The credential from the backing store only, ignoring the
    /// environment.
    pub async fn stored_api_key(&self) -> Result<Option<String>> {
        let stored = self.store.get(API_KEY_KEY).await?;
        Ok(stored.filter(|value| !value.trim().is_empty()))
    }

    pub async fn set_api_key(&self, key: &str) -> Result<()> {
        self.store.set(API_KEY_KEY, key).await
    }

    pub async fn clear_api_key(&self) -> Result<()> {
        self.store.remove(API_KEY_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;

    #[tokio::test]
    async fn stored_key_round_trips() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let credentials = CredentialStore::new(store);

        assert_eq!(credentials.stored_api_key().await.unwrap(), None);

        credentials.set_api_key("secret-key").await.unwrap();
        assert_eq!(
            credentials.stored_api_key().await.unwrap(),
            Some("secret-key".to_string())
        );

        credentials.clear_api_key().await.unwrap();
        assert_eq!(credentials.stored_api_key().await.unwrap(), None);
    }

    #[tokio::test]
    async fn blank_stored_key_counts_as_absent() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let credentials = CredentialStore::new(store);

        credentials.set_api_key("   ").await.unwrap();
        assert_eq!(credentials.stored_api_key().await.unwrap(), None);
    }
}
