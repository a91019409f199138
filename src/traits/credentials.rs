//! Credentials provider trait abstraction.
//!
//! Provides a trait-based abstraction for durable token-pair storage,
//! enabling dependency injection and mocking in tests.

use async_trait::async_trait;

use crate::auth::TokenPair;

/// Credentials operation errors.
#[derive(Debug, Clone)]
pub enum CredentialsError {
    /// Failed to load the stored pair
    LoadFailed(String),
    /// Failed to save the pair
    SaveFailed(String),
    /// Failed to clear stored state
    ClearFailed(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialsError::LoadFailed(msg) => write!(f, "Failed to load credentials: {}", msg),
            CredentialsError::SaveFailed(msg) => write!(f, "Failed to save credentials: {}", msg),
            CredentialsError::ClearFailed(msg) => {
                write!(f, "Failed to clear credentials: {}", msg)
            }
            CredentialsError::Other(msg) => write!(f, "Credentials error: {}", msg),
        }
    }
}

impl std::error::Error for CredentialsError {}

/// Trait for durable token-pair storage.
///
/// This trait abstracts persistence so that the token store can write
/// through to a real backend in production and an in-memory one in tests.
/// The pair is stored and replaced as one value; implementations never
/// persist half a pair.
///
/// # Example
///
/// ```ignore
/// use dropline::auth::TokenPair;
/// use dropline::traits::{CredentialsError, CredentialsProvider};
///
/// async fn remember<P: CredentialsProvider>(
///     provider: &P,
///     pair: &TokenPair,
/// ) -> Result<(), CredentialsError> {
///     provider.save(pair).await
/// }
/// ```
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Load the stored pair.
    ///
    /// # Returns
    /// - `Ok(Some(pair))` if a pair exists and was loaded successfully
    /// - `Ok(None)` if nothing is stored
    /// - `Err(error)` if loading failed
    async fn load(&self) -> Result<Option<TokenPair>, CredentialsError>;

    /// Save a pair, replacing any previous one.
    ///
    /// # Arguments
    /// * `pair` - The token pair to save
    ///
    /// # Returns
    /// Ok(()) on success, or an error if saving failed
    async fn save(&self, pair: &TokenPair) -> Result<(), CredentialsError>;

    /// Clear stored state. Clearing an empty store succeeds.
    ///
    /// # Returns
    /// Ok(()) on success, or an error if clearing failed
    async fn clear(&self) -> Result<(), CredentialsError>;
}
