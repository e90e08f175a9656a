//! Error types for the device database crate.
//!
//! This module provides structured error types for machine profile
//! management, persistence, and validation.

use std::io;
use thiserror::Error;

/// Errors that can occur during device management operations.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The requested profile was not found.
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// A profile with this ID already exists.
    #[error("Profile already exists: {0}")]
    ProfileAlreadyExists(String),

    /// The profile data is invalid.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// No profile has been selected as the active machine.
    #[error("No active machine profile")]
    NoActiveProfile,

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for device management operations.
pub type DeviceResult<T> = Result<T, DeviceError>;
