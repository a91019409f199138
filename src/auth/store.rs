//! Process-wide token storage.
//!
//! A single [`TokenStore`] owns the current [`TokenPair`] for the whole
//! process. Reads are lock-cheap clones; writes replace the pair as one
//! value and write through to the injected [`CredentialsProvider`] so the
//! session survives a restart. Persistence failures are logged and do not
//! fail the call — in-memory state is authoritative while the process
//! lives.

use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::auth::TokenPair;
use crate::traits::CredentialsProvider;

/// Holds the current credential pair and writes it through to storage.
pub struct TokenStore {
    /// The live pair. Replaced whole, never field by field.
    tokens: RwLock<Option<TokenPair>>,
    /// Durable backend for restarts.
    provider: Arc<dyn CredentialsProvider>,
}

impl TokenStore {
    /// Create an empty store backed by the given provider.
    pub fn new(provider: Arc<dyn CredentialsProvider>) -> Self {
        Self {
            tokens: RwLock::new(None),
            provider,
        }
    }

    /// Load the persisted pair, if any, into memory.
    ///
    /// Returns `true` if a pair was restored. A missing or unreadable
    /// backend leaves the store empty.
    pub async fn hydrate(&self) -> bool {
        match self.provider.load().await {
            Ok(Some(pair)) => {
                *self.tokens.write().unwrap() = Some(pair);
                debug!("Restored persisted credentials");
                true
            }
            Ok(None) => false,
            Err(err) => {
                warn!("Failed to load persisted credentials: {}", err);
                false
            }
        }
    }

    /// Get the current pair.
    pub fn get(&self) -> Option<TokenPair> {
        self.tokens.read().unwrap().clone()
    }

    /// Get the current access token.
    pub fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .unwrap()
            .as_ref()
            .map(|pair| pair.access_token.clone())
    }

    /// Get the current refresh token.
    pub fn refresh_token(&self) -> Option<String> {
        self.tokens
            .read()
            .unwrap()
            .as_ref()
            .map(|pair| pair.refresh_token.clone())
    }

    /// Whether a pair is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.read().unwrap().is_some()
    }

    /// Replace the stored pair and persist it.
    ///
    /// The in-memory write completes before persistence starts, so a
    /// concurrent reader sees either the old pair or the new one, never a
    /// mix.
    pub async fn set(&self, pair: TokenPair) {
        *self.tokens.write().unwrap() = Some(pair.clone());
        debug!("Stored new credential pair");

        if let Err(err) = self.provider.save(&pair).await {
            warn!("Failed to persist credentials: {}", err);
        }
    }

    /// Drop the stored pair and its persisted copy. Idempotent.
    pub async fn clear(&self) {
        *self.tokens.write().unwrap() = None;
        debug!("Cleared credential pair");

        if let Err(err) = self.provider.clear().await {
            warn!("Failed to clear persisted credentials: {}", err);
        }
    }
}
