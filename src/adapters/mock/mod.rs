//! Mock implementations for testing.
//!
//! These test doubles implement the traits in `crate::traits` without
//! network or file system access:
//!
//! - [`MockHttpClient`] - Configurable HTTP responses, sequences, and delays
//! - [`InMemoryCredentials`] - In-memory token-pair storage

pub mod credentials;
pub mod http;

pub use credentials::InMemoryCredentials;
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
