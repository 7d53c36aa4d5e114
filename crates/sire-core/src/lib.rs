//! SIRE Client Core
//!
//! Central coordination layer: owns configuration and wires the storage,
//! auth, and API crates into one client the UI shell drives.

mod client;
mod config;
mod error;

pub use client::Client;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use sire_api::{ApiClient, ApiError};
pub use sire_auth::{
    AuthApi, AuthError, AuthManager, AuthState, BearerToken, LoginOutcome, RefreshScheduler, Role,
    Session, SessionStore, UserProfile,
};
pub use sire_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
