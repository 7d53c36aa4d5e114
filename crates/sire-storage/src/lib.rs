//! SIRE Client Storage Layer
//!
//! SQLite-backed replacement for the browser's local storage: a small
//! key/value settings table the rest of the client persists into.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
