//! API error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}")]
    Status { status: reqwest::StatusCode },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
