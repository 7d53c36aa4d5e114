//! Authentication error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid credentials or transport failure during an explicit login.
    /// Surfaced to the user; never retried automatically.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The account authenticated but holds no usable role.
    #[error("Account has no accessible roles")]
    NoAccessibleRoles,

    /// Malformed or undecodable token. Non-fatal: disables the refresh
    /// watch without interrupting the current session.
    #[error("Token decode failed: {0}")]
    TokenDecode(String),

    /// Refresh endpoint unreachable or erroring. Logged, never escalated
    /// to logout; the next scheduled tick retries.
    #[error("Token refresh failed: {0}")]
    RefreshTransport(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sire_storage::StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
