//! Error type definitions

use crate::core::dispatch::{BatchFailure, ValidationError};
use crate::core::messaging::DecodeError;
use thiserror::Error;

/// Result type alias for the disperser
pub type Result<T> = std::result::Result<T, DisperserError>;

/// Main error type for the disperser
#[derive(Error, Debug)]
pub enum DisperserError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Batch payload failed schema validation; no action was executed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Transport envelope could not be decoded into a payload
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Every action ran, at least one did not succeed
    #[error("Batch execution failed: {0}")]
    BatchExecutionFailure(BatchFailure),

    /// Missing or wrong ingest credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),
}
