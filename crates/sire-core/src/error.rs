//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] sire_storage::StorageError),

    #[error("Auth error: {0}")]
    Auth(#[from] sire_auth::AuthError),

    #[error("API error: {0}")]
    Api(#[from] sire_api::ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
