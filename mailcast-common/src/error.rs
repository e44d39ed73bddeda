//! Common error types for mailcast

use thiserror::Error;

/// Common result type for mailcast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the mailcast crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bearer token missing, malformed, or expired
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
