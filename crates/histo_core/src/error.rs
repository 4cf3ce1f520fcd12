//! Error types for histo_core.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors shared across the histocartography crates.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Missing or invalid configuration key.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed input objects.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required artifact (checkpoint, data directory) does not exist.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Shape mismatch between tensors.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
