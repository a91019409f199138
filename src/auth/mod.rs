//! Authentication for the Dropline client.
//!
//! This module provides the pieces of the authenticated session:
//! - Token pair storage and persistence
//! - Display-subject extraction from access tokens
//! - Single-flight credential renewal

pub mod claims;
pub mod credentials;
pub mod refresh;
pub mod store;

pub use claims::extract_subject;
pub use credentials::{CredentialsManager, TokenPair};
pub use refresh::{RefreshCoordinator, RefreshError};
pub use store::TokenStore;
