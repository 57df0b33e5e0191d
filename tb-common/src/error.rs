//! Common error types for TrendBasket

use thiserror::Error;

/// Common result type for TrendBasket operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across TrendBasket crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or data
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
