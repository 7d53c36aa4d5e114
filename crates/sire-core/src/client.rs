//! Main client container
//!
//! Owns all core state; the UI shell is purely a renderer driving the
//! auth manager and subscribing to its state.

use std::sync::Arc;

use sire_api::ApiClient;
use sire_auth::{AuthManager, BearerToken, SessionStore};
use sire_storage::Database;

use crate::config::Config;
use crate::Result;

pub struct Client {
    config: Config,
    api: Arc<ApiClient>,
    auth: AuthManager,
}

impl Client {
    pub fn new(config: Config) -> Result<Self> {
        // Ensure data directory exists
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        let store = SessionStore::new(db);
        let bearer = BearerToken::new();
        let api = Arc::new(ApiClient::new(&config.api_base_url, bearer.clone())?);
        let auth = AuthManager::new(api.clone(), store, bearer);

        Ok(Self { config, api, auth })
    }

    /// Restore any persisted session. Run once at startup; the UI shows a
    /// splash while `loading` is true and routes to login or home after.
    pub fn initialize(&self) {
        self.auth.initialize();
        tracing::info!(
            authenticated = self.auth.state().authenticated,
            "Client initialized"
        );
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
