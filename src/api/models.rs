//! Wire types for the Dropline API.
//!
//! Request payloads serialize to the backend's snake_case JSON; response
//! types tolerate extra fields so server upgrades don't break older
//! clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload for `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Payload for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Payload for `POST /auth/refresh`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair returned by login and refresh.
///
/// Both fields are required: the provider rotates the whole pair on every
/// renewal, never just the access half. A response missing either field is
/// not a usable session.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Account details returned by `GET /users/me` and by registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiUser {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
}

/// Response from `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
}

/// The server's structured error shape.
///
/// Fields are individually optional; a body that fails to parse entirely
/// falls back to raw-text handling in the dispatcher.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_requires_both_fields() {
        let complete = r#"{"access_token":"a","refresh_token":"r"}"#;
        let parsed: TokenResponse = serde_json::from_str(complete).unwrap();
        assert_eq!(parsed.access_token, "a");
        assert_eq!(parsed.refresh_token, "r");

        let half = r#"{"access_token":"a"}"#;
        assert!(serde_json::from_str::<TokenResponse>(half).is_err());
    }

    #[test]
    fn test_token_response_ignores_extra_fields() {
        let json = r#"{"access_token":"a","refresh_token":"r","token_type":"bearer"}"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "a");
    }

    #[test]
    fn test_api_user_parse() {
        let json = r#"{"id":7,"email":"alice@example.com","is_active":true}"#;
        let user: ApiUser = serde_json::from_str(json).unwrap();
        assert_eq!(
            user,
            ApiUser {
                id: 7,
                email: "alice@example.com".to_string(),
                is_active: true,
            }
        );
    }

    #[test]
    fn test_error_body_full_shape() {
        let json = r#"{
            "status": 404,
            "error": "Not Found",
            "message": "No such conversation",
            "path": "/conversations/42",
            "timestamp": "2024-06-01T12:00:00Z"
        }"#;
        let body: ErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.status, Some(404));
        assert_eq!(body.error, Some("Not Found".to_string()));
        assert_eq!(body.message, Some("No such conversation".to_string()));
        assert_eq!(body.path, Some("/conversations/42".to_string()));
        assert!(body.timestamp.is_some());
    }

    #[test]
    fn test_error_body_partial_shape() {
        let json = r#"{"message":"nope"}"#;
        let body: ErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.message, Some("nope".to_string()));
        assert_eq!(body.status, None);
        assert_eq!(body.timestamp, None);
    }

    #[test]
    fn test_register_request_serializes_snake_case() {
        let request = RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""username":"alice""#));
        assert!(json.contains(r#""email":"alice@example.com""#));
    }

    #[test]
    fn test_refresh_request_field_name() {
        let request = RefreshRequest {
            refresh_token: "r-1".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"refresh_token":"r-1"}"#);
    }
}
