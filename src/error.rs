use thiserror::Error;

use crate::types::OperationError;

#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("No successful backup was found on the source, cannot restore")]
    NoEligibleBackup,

    /// Raised when a polled operation carries a non-empty error list. The
    /// message is the first nested entry's message; the full list is kept.
    #[error("Operation failed: {message}")]
    OperationFailed {
        message: String,
        errors: Vec<OperationError>,
    },
}

pub type Result<T> = std::result::Result<T, RestoreError>;
