//! Error types for histo_data.

use thiserror::Error;

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur in data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Missing data directory or instance file.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Index out of bounds.
    #[error("Index {index} out of bounds for length {length}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The length of the collection.
        length: usize,
    },

    /// Instance file could not be parsed.
    #[error("File format error in {path}: {source}")]
    FormatError {
        /// Offending file.
        path: String,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Graph construction failed.
    #[error("Core error: {0}")]
    CoreError(#[from] histo_core::CoreError),
}
