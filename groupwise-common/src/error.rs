//! Common error types for groupwise

use thiserror::Error;

/// Common result type for groupwise operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the engine and its front ends
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid user input or request parameter (bad group size, empty roster, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration parse error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON request/response (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Broken internal invariant; the computation is aborted
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than the engine
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::Json(_))
    }
}
