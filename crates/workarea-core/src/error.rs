//! Error handling for WorkArea Outliner
//!
//! Errors raised while locating jobs on disk and reading the metadata a host
//! stored for them. All error types use `thiserror`.

use thiserror::Error;

/// Errors produced while decoding a stored metadata record.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The record exists but does not have the expected shape
    #[error("Malformed metadata for {filename}: {reason}")]
    Malformed {
        /// The job the record belongs to.
        filename: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The metadata file is not valid JSON
    #[error("Invalid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main error type for WorkArea Outliner core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored metadata could not be decoded
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// The job cannot be resolved to a file on disk
    #[error("Invalid job: {0}")]
    InvalidJob(String),
}

impl Error {
    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidJob("sdcard files have no local path".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid job: sdcard files have no local path"
        );

        let err = MetadataError::Malformed {
            filename: "part.gcode".to_string(),
            reason: "printingArea is not an object".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed metadata for part.gcode: printingArea is not an object"
        );
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(err.is_io_error());

        let meta_err = MetadataError::Malformed {
            filename: "a".to_string(),
            reason: "b".to_string(),
        };
        let err: Error = meta_err.into();
        assert!(matches!(err, Error::Metadata(_)));
    }
}
