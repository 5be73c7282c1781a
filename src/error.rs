//! Error types for the TempMail client.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for all TempMail client operations.
pub enum Error {
    /// Underlying HTTP client error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Response body could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
    /// Backend refused or failed to provision an address.
    #[error("provisioning error: {0}")]
    Provisioning(String),
    /// HTTP response returned a non-success status with body.
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Result type for TempMail client operations.
pub type Result<T> = std::result::Result<T, Error>;
