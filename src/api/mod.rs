//! The Dropline API surface.
//!
//! [`ApiClient`] dispatches every request: it attaches the stored bearer
//! token, renews it through the coordinator on a 401, and replays the
//! request once. [`Request`] is the replayable request value, [`models`]
//! holds the wire types, and [`ApiError`] is the uniform failure type
//! callers branch on.

pub mod client;
pub mod error;
pub mod models;
pub mod request;

pub use client::ApiClient;
pub use error::ApiError;
pub use request::{Method, Request};
