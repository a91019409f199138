//! File-based credentials provider adapter.
//!
//! This module lifts the synchronous [`CredentialsManager`] into the
//! async [`CredentialsProvider`] trait.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::auth::credentials::CredentialsManager;
use crate::auth::TokenPair;
use crate::traits::{CredentialsError, CredentialsProvider};

/// File-based credentials provider.
///
/// This adapter wraps [`CredentialsManager`] and implements the
/// [`CredentialsProvider`] trait. By default the pair is stored in
/// `~/.dropline/credentials.json`.
///
/// # Example
///
/// ```ignore
/// use dropline::adapters::FileCredentialsProvider;
/// use dropline::traits::CredentialsProvider;
///
/// let provider = FileCredentialsProvider::new()?;
///
/// if let Some(pair) = provider.load().await? {
///     println!("Found a stored session");
/// }
/// ```
#[derive(Debug)]
pub struct FileCredentialsProvider {
    manager: CredentialsManager,
}

impl FileCredentialsProvider {
    /// Create a provider using the default credentials location.
    ///
    /// # Returns
    /// The provider, or an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, CredentialsError> {
        CredentialsManager::new()
            .map(|manager| Self { manager })
            .ok_or_else(|| {
                CredentialsError::Other("Failed to determine home directory".to_string())
            })
    }

    /// Create a provider reading and writing a specific file.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            manager: CredentialsManager::with_path(path),
        }
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &PathBuf {
        self.manager.credentials_path()
    }
}

#[async_trait]
impl CredentialsProvider for FileCredentialsProvider {
    async fn load(&self) -> Result<Option<TokenPair>, CredentialsError> {
        // A missing or corrupt file reads as no session; the manager
        // already folds those cases into None
        Ok(self.manager.load())
    }

    async fn save(&self, pair: &TokenPair) -> Result<(), CredentialsError> {
        if self.manager.save(pair) {
            Ok(())
        } else {
            Err(CredentialsError::SaveFailed(
                "Failed to write credentials file".to_string(),
            ))
        }
    }

    async fn clear(&self) -> Result<(), CredentialsError> {
        if self.manager.clear() {
            Ok(())
        } else {
            Err(CredentialsError::ClearFailed(
                "Failed to delete credentials file".to_string(),
            ))
        }
    }
}
