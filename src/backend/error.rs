//! Error types for the backend client.

use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The operation needs a signed-in user.
    #[error("authentication required")]
    AuthRequired,

    /// Sign-in or sign-up was rejected.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The response body did not have the expected shape.
    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
