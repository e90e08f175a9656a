//! Error types for controller communication.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommunicationError {
    /// The serial port could not be opened
    #[error("Failed to open port {port}: {reason}")]
    PortOpen { port: String, reason: String },

    /// The background writer has stopped accepting commands
    #[error("Transport closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type CommunicationResult<T> = Result<T, CommunicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CommunicationError::PortOpen {
            port: "/dev/ttyUSB0".to_string(),
            reason: "Permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to open port /dev/ttyUSB0: Permission denied"
        );
    }
}
