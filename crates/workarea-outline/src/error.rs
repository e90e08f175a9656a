//! Error types for the outline command.

use thiserror::Error;
use workarea_devicedb::DeviceError;
use workarea_settings::SettingsError;

/// Failures surfaced to the caller of the `outline` command
#[derive(Error, Debug)]
pub enum OutlineError {
    /// No strategy produced a usable bounding box
    #[error("Could not find work area.")]
    MetadataUnavailable,

    #[error("Unknown Command")]
    UnknownCommand(String),

    #[error("No file selected")]
    NoActiveJob,

    #[error("Cannot outline while printing")]
    JobPrinting,

    /// Another outline is still being planned or submitted
    #[error("Outline already in progress")]
    Busy,

    #[error("Configuration error: {0}")]
    Configuration(#[from] SettingsError),

    #[error("Machine profile error: {0}")]
    Profile(#[from] DeviceError),

    #[error(transparent)]
    Core(#[from] workarea_core::Error),
}

impl OutlineError {
    /// HTTP-style status reported with the error
    pub fn status(&self) -> u16 {
        match self {
            Self::Busy | Self::NoActiveJob | Self::JobPrinting => 409,
            _ => 500,
        }
    }
}

pub type OutlineResult<T> = Result<T, OutlineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            OutlineError::MetadataUnavailable.to_string(),
            "Could not find work area."
        );
        assert_eq!(
            OutlineError::UnknownCommand("trace".into()).to_string(),
            "Unknown Command"
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(OutlineError::MetadataUnavailable.status(), 500);
        assert_eq!(OutlineError::UnknownCommand("x".into()).status(), 500);
        assert_eq!(OutlineError::Busy.status(), 409);
        assert_eq!(OutlineError::NoActiveJob.status(), 409);
        assert_eq!(OutlineError::JobPrinting.status(), 409);
        assert_eq!(
            OutlineError::Profile(DeviceError::NoActiveProfile).status(),
            500
        );
    }
}
