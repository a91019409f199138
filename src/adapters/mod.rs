//! Concrete implementations of trait abstractions.
//!
//! This module provides production-ready adapters that implement the
//! traits defined in `crate::traits`, enabling dependency injection and
//! testability.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP transport using reqwest
//! - [`FileCredentialsProvider`] - File-based token-pair storage
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable HTTP responses
//! - [`mock::InMemoryCredentials`] - In-memory token-pair storage

pub mod file_credentials;
pub mod mock;
pub mod reqwest_http;

pub use file_credentials::FileCredentialsProvider;
pub use mock::{InMemoryCredentials, MockHttpClient};
pub use reqwest_http::ReqwestHttpClient;
