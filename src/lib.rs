//! Dropline API client with transparent bearer-token refresh.
//!
//! The hard part of talking to the Dropline API is not the HTTP — it is
//! keeping many concurrent callers from racing on short-lived credentials.
//! This crate centralizes that: a process-wide token store, a single-flight
//! renewal coordinator, and a dispatcher that retries a 401'd request
//! exactly once with the renewed token.
//!
//! ```ignore
//! use dropline::{ApiClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new(ClientConfig::from_env()?)?;
//!     if !client.restore_session().await {
//!         client.login("alice", "hunter2").await?;
//!     }
//!     let me = client.me().await?;
//!     println!("signed in: {}", me.email);
//!     Ok(())
//! }
//! ```
//!
//! Transport and storage sit behind traits ([`traits::HttpClient`],
//! [`traits::CredentialsProvider`]); production adapters and in-memory
//! mocks live in [`adapters`].

pub mod adapters;
pub mod api;
pub mod auth;
pub mod config;
pub mod traits;

pub use api::{ApiClient, ApiError, Method, Request};
pub use auth::{extract_subject, RefreshError, TokenPair};
pub use config::{ClientConfig, ConfigError};
