//! Error types for G-code reading and analysis.

use std::io;
use thiserror::Error;

/// Errors raised while reading job files
#[derive(Error, Debug)]
pub enum GcodeError {
    /// The file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A header dialect was recognised but its values could not be parsed
    #[error("Malformed {dialect} metadata: {reason}")]
    MalformedMetadata { dialect: String, reason: String },

    /// The file contains no moves, so it has no extents
    #[error("No motion commands found in {0}")]
    NoMotion(String),
}

impl GcodeError {
    pub fn malformed(dialect: &str, reason: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            dialect: dialect.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for G-code operations
pub type GcodeResult<T> = Result<T, GcodeError>;
