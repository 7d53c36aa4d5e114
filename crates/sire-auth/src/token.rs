//! Bearer token claims
//!
//! The client never verifies signatures; it only needs the `exp` claim to
//! drive refresh scheduling, so the JWT payload segment is decoded locally
//! without any network access.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AuthError;
use crate::Result;

#[derive(Debug, Deserialize)]
struct Claims {
    /// Seconds since epoch
    exp: i64,
}

/// Extract the expiry timestamp from a signed token.
pub fn decode_expiry(token: &str) -> Result<DateTime<Utc>> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::TokenDecode("token has no payload segment".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AuthError::TokenDecode(e.to_string()))?;

    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|e| AuthError::TokenDecode(e.to_string()))?;

    DateTime::from_timestamp(claims.exp, 0)
        .ok_or_else(|| AuthError::TokenDecode(format!("exp out of range: {}", claims.exp)))
}

#[cfg(test)]
pub(crate) fn encode_test_token(exp: DateTime<Utc>) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp.timestamp()));
    format!("{header}.{payload}.sig")
}
