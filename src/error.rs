//! Error types for learnflux
//!
//! Scoring functions never fail. Errors only surface at the JSON boundary and
//! while loading configuration.

use thiserror::Error;

/// Errors that can occur while decoding requests or loading configuration
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse request: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Interaction history must be a JSON array, got {0}")]
    InvalidHistory(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
