//! Error taxonomy for dispatched requests.
//!
//! The dispatcher folds every failure into three kinds: the session is
//! gone (`Unauthorized`), the network is gone (`Transport`), or the server
//! said no (`Protocol`). Callers branch on the kind, not on status codes.

use crate::api::models::ErrorBody;
use crate::traits::{HttpError, Response};

/// Errors surfaced by the authenticated dispatcher.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Credential renewal failed or was impossible. The caller must
    /// re-authenticate; stored credentials have already been cleared.
    Unauthorized,
    /// The request never completed (connection, timeout, DNS). Retrying
    /// later is safe. Never triggers renewal.
    Transport(HttpError),
    /// The server answered with a non-success status for a reason other
    /// than an expired credential. Not retried automatically.
    Protocol { status: u16, message: String },
}

impl ApiError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// Whether the caller must re-authenticate before trying again.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            ApiError::Transport(_) => {
                "Unable to reach the server. Please check your internet connection.".to_string()
            }
            ApiError::Protocol { status, message } => match *status {
                400 => "The request was invalid. Please try again.".to_string(),
                403 => "Access denied. You don't have permission for this action.".to_string(),
                404 => "The requested resource was not found.".to_string(),
                500..=599 => "The server is experiencing issues. Please try again later.".to_string(),
                _ => format!("The server returned an error (HTTP {}): {}", status, message),
            },
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "Unauthorized: re-authentication required"),
            ApiError::Transport(err) => write!(f, "Transport error: {}", err),
            ApiError::Protocol { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        ApiError::Transport(err)
    }
}

/// Build the `Protocol` error for a non-success response.
pub(crate) fn protocol_error(response: &Response) -> ApiError {
    ApiError::Protocol {
        status: response.status,
        message: error_message(response),
    }
}

/// Decode the message a failed response carries.
///
/// Prefers the structured error body when the server declares JSON
/// (`message`, then `error`), falls back to raw body text, then to the
/// bare status.
fn error_message(response: &Response) -> String {
    let declares_json = response
        .content_type()
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);

    if declares_json {
        if let Ok(body) = response.json::<ErrorBody>() {
            if let Some(message) = body.message.or(body.error) {
                return message;
            }
        }
    }

    match response.text() {
        Ok(text) if !text.trim().is_empty() => text,
        _ => format!("HTTP {}", response.status),
    }
}
