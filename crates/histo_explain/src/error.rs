//! Error types for explanation.

use histo_core::CoreError;
use histo_models::ModelError;
use thiserror::Error;

/// Result type alias for explanation operations.
pub type Result<T> = std::result::Result<T, ExplainError>;

/// Errors that can occur while explaining an instance.
#[derive(Error, Debug)]
pub enum ExplainError {
    /// Missing or malformed configuration section.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unusable optimizer parameters.
    #[error("Invalid explainer config: {0}")]
    InvalidConfig(String),

    /// Malformed input graph or mask.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The model failed during a forward pass.
    #[error("Model invocation failed: {0}")]
    ModelInvocation(#[from] ModelError),

    /// Tensor data could not be read back.
    #[error("Tensor error: {0}")]
    Tensor(String),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
