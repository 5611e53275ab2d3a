//! Common error types for tablero

use thiserror::Error;

/// Common result type for tablero operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across tablero modules
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data source unreachable (authentication or fetch failure).
    /// Fatal for the current refresh; the next refresh retries from scratch.
    #[error("Source error: {0}")]
    Source(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
