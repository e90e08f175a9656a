//! Settings Persistence
//!
//! Resolves where settings live on disk and loads or saves them there. A
//! missing file means "use defaults"; a malformed one is an error.

use crate::config::OutlinerSettings;
use crate::error::{SettingsError, SettingsResult};
use std::path::{Path, PathBuf};

/// Directory name under the platform config directory
pub const APP_DIR_NAME: &str = "workarea";

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Settings file on disk
#[derive(Debug, Clone)]
pub struct SettingsPersistence {
    path: PathBuf,
}

impl SettingsPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Persistence at the platform default location
    pub fn at_default_location() -> SettingsResult<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// `<config dir>/workarea/settings.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })?;
        Ok(base.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(&self) -> SettingsResult<OutlinerSettings> {
        if !self.path.exists() {
            tracing::debug!(
                "Settings file {} not found, using defaults",
                self.path.display()
            );
            return Ok(OutlinerSettings::default());
        }
        OutlinerSettings::load_from_file(&self.path)
    }

    /// Save settings, creating the parent directory if needed
    pub fn save(&self, settings: &OutlinerSettings) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
                })?;
            }
        }
        settings.save_to_file(&self.path)?;
        tracing::info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
