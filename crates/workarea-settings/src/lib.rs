//! WorkArea Settings Crate
//!
//! Handles the outline configuration schema, its persistence, and the
//! per-request snapshots handed to the planner.

pub mod config;
pub mod error;
pub mod manager;
pub mod persistence;
pub mod traits;

pub use config::{FeedrateSource, OutlinerSettings, XyEndMode, ZEndMode};
pub use error::{SettingsError, SettingsResult};
pub use manager::SettingsManager;
pub use persistence::SettingsPersistence;
pub use traits::ConfigurationProvider;
