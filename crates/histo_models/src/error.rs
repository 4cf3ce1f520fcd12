//! Error types for model invocation.

use thiserror::Error;

/// Result type alias for model forward passes.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while running a model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Input tensors do not fit the model.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Model forward pass failed.
    #[error("Forward pass failed: {0}")]
    Forward(String),
}
