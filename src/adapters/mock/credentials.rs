//! In-memory credentials provider for testing.
//!
//! Provides a credentials provider that stores the token pair in memory,
//! suitable for testing without file system access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::auth::TokenPair;
use crate::traits::{CredentialsError, CredentialsProvider};

/// In-memory credentials provider for testing.
///
/// This provider stores the token pair in memory, allowing tests to
/// verify credential operations without touching the file system. Each
/// operation can be toggled to fail.
///
/// # Example
///
/// ```ignore
/// use dropline::adapters::mock::InMemoryCredentials;
/// use dropline::auth::TokenPair;
/// use dropline::traits::CredentialsProvider;
///
/// let provider = InMemoryCredentials::new();
///
/// // Initially empty
/// assert!(provider.load().await?.is_none());
///
/// // Save a pair
/// provider.save(&TokenPair::new("access", "refresh")).await?;
///
/// // Load it back
/// let loaded = provider.load().await?.unwrap();
/// assert_eq!(loaded.access_token, "access");
///
/// // Clear
/// provider.clear().await?;
/// assert!(provider.load().await?.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryCredentials {
    /// Stored pair
    pair: Arc<Mutex<Option<TokenPair>>>,
    /// Whether save should fail
    save_should_fail: Arc<Mutex<bool>>,
    /// Whether load should fail
    load_should_fail: Arc<Mutex<bool>>,
    /// Whether clear should fail
    clear_should_fail: Arc<Mutex<bool>>,
}

impl InMemoryCredentials {
    /// Create a new empty in-memory credentials provider.
    pub fn new() -> Self {
        Self {
            pair: Arc::new(Mutex::new(None)),
            save_should_fail: Arc::new(Mutex::new(false)),
            load_should_fail: Arc::new(Mutex::new(false)),
            clear_should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Create a provider with an initial pair.
    pub fn with_pair(pair: TokenPair) -> Self {
        let provider = Self::new();
        *provider.pair.lock().unwrap() = Some(pair);
        provider
    }

    /// Configure whether save should fail.
    pub fn set_save_should_fail(&self, should_fail: bool) {
        *self.save_should_fail.lock().unwrap() = should_fail;
    }

    /// Configure whether load should fail.
    pub fn set_load_should_fail(&self, should_fail: bool) {
        *self.load_should_fail.lock().unwrap() = should_fail;
    }

    /// Configure whether clear should fail.
    pub fn set_clear_should_fail(&self, should_fail: bool) {
        *self.clear_should_fail.lock().unwrap() = should_fail;
    }

    /// Get the stored pair synchronously (for assertions).
    pub fn stored(&self) -> Option<TokenPair> {
        self.pair.lock().unwrap().clone()
    }
}

impl Default for InMemoryCredentials {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialsProvider for InMemoryCredentials {
    async fn load(&self) -> Result<Option<TokenPair>, CredentialsError> {
        if *self.load_should_fail.lock().unwrap() {
            return Err(CredentialsError::LoadFailed(
                "Mock load failure".to_string(),
            ));
        }

        Ok(self.pair.lock().unwrap().clone())
    }

    async fn save(&self, pair: &TokenPair) -> Result<(), CredentialsError> {
        if *self.save_should_fail.lock().unwrap() {
            return Err(CredentialsError::SaveFailed(
                "Mock save failure".to_string(),
            ));
        }

        *self.pair.lock().unwrap() = Some(pair.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialsError> {
        if *self.clear_should_fail.lock().unwrap() {
            return Err(CredentialsError::ClearFailed(
                "Mock clear failure".to_string(),
            ));
        }

        *self.pair.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_empty() {
        let provider = InMemoryCredentials::new();
        assert!(provider.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let provider = InMemoryCredentials::new();
        let pair = TokenPair::new("test-access", "test-refresh");

        provider.save(&pair).await.unwrap();

        let loaded = provider.load().await.unwrap();
        assert_eq!(loaded, Some(pair));
    }

    #[test]
    fn test_with_pair() {
        let provider = InMemoryCredentials::with_pair(TokenPair::new("initial", "refresh"));
        assert_eq!(
            provider.stored(),
            Some(TokenPair::new("initial", "refresh"))
        );
    }

    #[tokio::test]
    async fn test_clear() {
        let provider = InMemoryCredentials::with_pair(TokenPair::new("a", "r"));

        provider.clear().await.unwrap();
        assert!(provider.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_pair() {
        let provider = InMemoryCredentials::new();

        provider.save(&TokenPair::new("first", "r1")).await.unwrap();
        provider.save(&TokenPair::new("second", "r2")).await.unwrap();

        let loaded = provider.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "second");
    }

    #[tokio::test]
    async fn test_load_failure() {
        let provider = InMemoryCredentials::new();
        provider.set_load_should_fail(true);

        let result = provider.load().await;
        assert!(matches!(result, Err(CredentialsError::LoadFailed(_))));
    }

    #[tokio::test]
    async fn test_save_failure() {
        let provider = InMemoryCredentials::new();
        provider.set_save_should_fail(true);

        let result = provider.save(&TokenPair::new("a", "r")).await;
        assert!(matches!(result, Err(CredentialsError::SaveFailed(_))));
    }

    #[tokio::test]
    async fn test_clear_failure() {
        let provider = InMemoryCredentials::new();
        provider.set_clear_should_fail(true);

        let result = provider.clear().await;
        assert!(matches!(result, Err(CredentialsError::ClearFailed(_))));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let provider = InMemoryCredentials::new();
        let cloned = provider.clone();

        provider.save(&TokenPair::new("shared", "r")).await.unwrap();
        assert_eq!(cloned.stored(), Some(TokenPair::new("shared", "r")));

        cloned.clear().await.unwrap();
        assert!(provider.stored().is_none());
    }

    #[tokio::test]
    async fn test_providers_are_isolated() {
        let provider1 = InMemoryCredentials::new();
        let provider2 = InMemoryCredentials::new();

        provider1
            .save(&TokenPair::new("isolated", "r"))
            .await
            .unwrap();

        assert!(provider2.load().await.unwrap().is_none());
    }
}
