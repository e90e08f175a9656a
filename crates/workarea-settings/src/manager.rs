//! Settings Manager
//!
//! Owns the current outline settings. Settings are read once at start-up and
//! again after every save; requests take an immutable snapshot so a save in the
//! middle of an outline cannot change it.

use crate::config::OutlinerSettings;
use crate::error::SettingsResult;
use crate::persistence::SettingsPersistence;
use crate::traits::ConfigurationProvider;
use parking_lot::RwLock;
use std::sync::Arc;

/// Current settings plus their backing file
#[derive(Debug)]
pub struct SettingsManager {
    persistence: Option<SettingsPersistence>,
    current: RwLock<Arc<OutlinerSettings>>,
}

impl SettingsManager {
    /// Create a manager backed by a settings file and load it
    pub fn new(persistence: SettingsPersistence) -> SettingsResult<Self> {
        let manager = Self {
            persistence: Some(persistence),
            current: RwLock::new(Arc::new(OutlinerSettings::default())),
        };
        manager.initialize()?;
        Ok(manager)
    }

    /// Create a manager that keeps settings in memory only
    pub fn in_memory(settings: OutlinerSettings) -> Self {
        Self {
            persistence: None,
            current: RwLock::new(Arc::new(settings)),
        }
    }

    pub fn persistence(&self) -> Option<&SettingsPersistence> {
        self.persistence.as_ref()
    }

    /// Re-read settings from storage
    pub fn initialize(&self) -> SettingsResult<()> {
        if let Some(persistence) = &self.persistence {
            let loaded = persistence.load_or_default()?;
            *self.current.write() = Arc::new(loaded);
        }
        Ok(())
    }

    /// Persist new settings, then reload them
    pub fn save(&self, settings: OutlinerSettings) -> SettingsResult<()> {
        settings.validate()?;
        match &self.persistence {
            Some(persistence) => {
                persistence.save(&settings)?;
                self.initialize()
            }
            None => {
                *self.current.write() = Arc::new(settings);
                Ok(())
            }
        }
    }

    /// Update a single key and save
    pub fn set_value(&self, key: &str, value: &str) -> SettingsResult<()> {
        let mut updated = (*self.snapshot()).clone();
        updated.set_value(key, value)?;
        self.save(updated)
    }
}

impl ConfigurationProvider for SettingsManager {
    fn snapshot(&self) -> Arc<OutlinerSettings> {
        self.current.read().clone()
    }
}
