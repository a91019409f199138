//! Display-subject extraction from access tokens.
//!
//! The access token is a JWT-shaped string whose payload carries a subject
//! identifier. Nothing here verifies the signature or the expiry; the
//! server remains the authority on validity. This is display-only data.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

/// Payload fields that may carry the display subject.
///
/// Values are kept as raw JSON because backends disagree on whether the
/// subject is a string or a numeric id.
#[derive(Deserialize)]
struct SubjectClaims {
    #[serde(default)]
    sub: Option<Value>,
    #[serde(default, rename = "userName")]
    user_name: Option<Value>,
    #[serde(default)]
    username: Option<Value>,
}

/// Extract a display subject from an access token.
///
/// Splits the token on `.`, base64url-decodes the payload segment, and
/// returns the first usable field of `sub`, `userName`, `username`.
/// Empty strings are skipped; numeric ids are rendered as strings.
///
/// Returns `None` for anything that fails to decode or parse. Malformed
/// tokens are an expected input here, never an error.
pub fn extract_subject(access_token: &str) -> Option<String> {
    let parts: Vec<&str> = access_token.split('.').collect();
    let payload = URL_SAFE_NO_PAD.decode(parts.get(1)?).ok()?;
    let claims: SubjectClaims = serde_json::from_slice(&payload).ok()?;

    [claims.sub, claims.user_name, claims.username]
        .iter()
        .flatten()
        .find_map(display_value)
}

/// Render a claim value as a display string, if it has one.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
