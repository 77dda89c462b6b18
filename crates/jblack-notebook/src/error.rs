//! Error types for Jupyter notebook parsing

use thiserror::Error;

/// Error type for notebook parsing and serialization
#[derive(Error, Debug)]
pub enum NotebookError {
    /// I/O error when reading a notebook file
    #[error("Failed to read notebook file: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("Failed to parse notebook JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Notebook file is not valid UTF-8
    #[error("Notebook is not valid UTF-8: {0}")]
    EncodingError(#[from] std::string::FromUtf8Error),

    /// Invalid notebook structure (missing `cells`, bad `cell_type` or `source`)
    #[error("Invalid notebook format: {0}")]
    InvalidFormat(String),
}

/// Result type alias for notebook operations
pub type Result<T> = std::result::Result<T, NotebookError>;
