//! Error types shared across the ACS workspace

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, AcsError>;

/// Main error type for shared ACS utilities
#[derive(Error, Debug)]
pub enum AcsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),

    #[error("Text is not valid {encoding}: {context}")]
    Decode { encoding: String, context: String },
}

impl AcsError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
