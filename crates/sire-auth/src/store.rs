//! Session persistence
//!
//! Stores the whole session as one JSON blob under a fixed settings key,
//! mirroring the single local-storage entry the web client used.

use sire_storage::Database;

use crate::session::Session;
use crate::Result;

const SESSION_KEY: &str = "sire.session";

#[derive(Clone)]
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist the full session record, overwriting any prior value.
    pub fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string(session)?;
        self.db.set_setting(SESSION_KEY, &json)?;
        Ok(())
    }

    /// Load the persisted session. A missing or unparseable record is
    /// treated as "no session"; corruption is logged, never surfaced.
    pub fn load(&self) -> Result<Option<Session>> {
        let Some(json) = self.db.get_setting(SESSION_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str(&json) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unparseable stored session");
                Ok(None)
            }
        }
    }

    /// Remove the persisted record. Idempotent.
    pub fn clear(&self) -> Result<()> {
        self.db.delete_setting(SESSION_KEY)?;
        Ok(())
    }
}
