//! Error types for cadence-ops
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. The variants mirror the conditions the API distinguishes:
//! missing records, transitions that conflict with the sequence invariants,
//! bad request input, write races, and persistence failures.

use thiserror::Error;

/// Main error type for the cadence-ops service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation conflicts with the current state of the record
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Missing or malformed request input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Concurrent write detected by the version check
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<cadence_common::Error> for Error {
    fn from(err: cadence_common::Error) -> Self {
        match err {
            cadence_common::Error::Database(e) => Error::Database(e),
            cadence_common::Error::NotFound(msg) => Error::NotFound(msg),
            cadence_common::Error::InvalidInput(msg) => Error::Validation(msg),
            cadence_common::Error::Config(msg) => Error::Config(msg),
            cadence_common::Error::Io(e) => Error::Internal(e.to_string()),
            cadence_common::Error::Internal(msg) => Error::Internal(msg),
        }
    }
}

/// Convenience Result type using cadence-ops Error
pub type Result<T> = std::result::Result<T, Error>;
