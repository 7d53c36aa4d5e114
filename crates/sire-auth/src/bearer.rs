//! Outbound authorization state
//!
//! Instead of a mutable default header on a shared HTTP client, the current
//! bearer token lives in one shared slot. The API client reads it at
//! request-build time; only the auth layer writes it.

use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct BearerToken {
    token: Arc<RwLock<Option<String>>>,
}

impl BearerToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: &str) {
        *self.token.write() = Some(token.to_string());
    }

    pub fn clear(&self) {
        *self.token.write() = None;
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Value for the `Authorization` header, if a token is set.
    pub fn header_value(&self) -> Option<String> {
        self.token.read().as_ref().map(|t| format!("Bearer {t}"))
    }
}
