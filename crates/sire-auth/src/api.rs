//! Transport seam for the authentication endpoints
//!
//! The manager and scheduler only ever talk to this trait; `sire-api`
//! provides the HTTP implementation, tests provide mocks.

use async_trait::async_trait;

use crate::session::Session;
use crate::Result;

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a session payload. The returned session
    /// has no active role yet.
    async fn login(&self, username: &str, password: &str) -> Result<Session>;

    /// Exchange a still-valid token for a fresh one.
    async fn refresh_token(&self, token: &str) -> Result<String>;
}
