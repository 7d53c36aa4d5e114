//! SIRE Client API layer
//!
//! Thin reqwest wrapper over the platform's HTTP API. Every outbound
//! request reads the bearer slot at build time, so there is no mutable
//! default header to fall out of sync with the session.

mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

pub type Result<T> = std::result::Result<T, ApiError>;
