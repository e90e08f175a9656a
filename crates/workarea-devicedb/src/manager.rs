//! Device Manager
//!
//! Keeps the known machine profiles and which one is active. Profiles are
//! persisted as a JSON document `{ "active": <id>, "profiles": [...] }`.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use workarea_core::{Axis, BoundingBox};

use crate::error::{DeviceError, DeviceResult};
use crate::model::DeviceProfile;
use crate::traits::{AxisSpeeds, MachineProfileProvider};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileDocument {
    #[serde(default)]
    active: Option<String>,
    #[serde(default)]
    profiles: Vec<DeviceProfile>,
}

#[derive(Debug, Default)]
struct ProfileState {
    profiles: HashMap<String, DeviceProfile>,
    active: Option<String>,
}

#[derive(Debug)]
pub struct DeviceManager {
    path: Option<PathBuf>,
    state: RwLock<ProfileState>,
}

impl DeviceManager {
    /// In-memory manager with no profiles
    pub fn new() -> Self {
        Self {
            path: None,
            state: RwLock::new(ProfileState::default()),
        }
    }

    /// Manager holding a single active profile
    pub fn with_profile(profile: DeviceProfile) -> DeviceResult<Self> {
        let manager = Self::new();
        let id = profile.id.clone();
        manager.add_profile(profile)?;
        manager.set_active(&id)?;
        Ok(manager)
    }

    /// Load profiles from a JSON file
    pub fn load(path: impl Into<PathBuf>) -> DeviceResult<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        let document: ProfileDocument = serde_json::from_str(&content)?;

        let mut state = ProfileState::default();
        for profile in document.profiles {
            profile.validate()?;
            if state.profiles.contains_key(&profile.id) {
                return Err(DeviceError::ProfileAlreadyExists(profile.id));
            }
            state.profiles.insert(profile.id.clone(), profile);
        }

        if let Some(active) = &document.active {
            if !state.profiles.contains_key(active) {
                return Err(DeviceError::ProfileNotFound(active.clone()));
            }
        }
        state.active = document.active;

        tracing::info!(
            "Loaded {} machine profile(s) from {}",
            state.profiles.len(),
            path.display()
        );

        Ok(Self {
            path: Some(path),
            state: RwLock::new(state),
        })
    }

    /// Write profiles back to the file they were loaded from
    pub fn save(&self) -> DeviceResult<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| DeviceError::InvalidProfile("manager has no backing file".into()))?;
        self.save_to(path)
    }

    pub fn save_to(&self, path: &Path) -> DeviceResult<()> {
        let state = self.state.read();
        let mut profiles: Vec<DeviceProfile> = state.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| a.id.cmp(&b.id));

        let document = ProfileDocument {
            active: state.active.clone(),
            profiles,
        };
        std::fs::write(path, serde_json::to_string_pretty(&document)?)?;
        Ok(())
    }

    pub fn add_profile(&self, profile: DeviceProfile) -> DeviceResult<()> {
        profile.validate()?;
        let mut state = self.state.write();
        if state.profiles.contains_key(&profile.id) {
            return Err(DeviceError::ProfileAlreadyExists(profile.id));
        }
        state.profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    pub fn remove_profile(&self, id: &str) -> DeviceResult<DeviceProfile> {
        let mut state = self.state.write();
        let removed = state
            .profiles
            .remove(id)
            .ok_or_else(|| DeviceError::ProfileNotFound(id.to_string()))?;
        if state.active.as_deref() == Some(id) {
            state.active = None;
        }
        Ok(removed)
    }

    pub fn profile_count(&self) -> usize {
        self.state.read().profiles.len()
    }

    pub fn set_active(&self, id: &str) -> DeviceResult<()> {
        let mut state = self.state.write();
        if !state.profiles.contains_key(id) {
            return Err(DeviceError::ProfileNotFound(id.to_string()));
        }
        state.active = Some(id.to_string());
        Ok(())
    }

    pub fn active_profile(&self) -> DeviceResult<DeviceProfile> {
        let state = self.state.read();
        let id = state.active.as_ref().ok_or(DeviceError::NoActiveProfile)?;
        state
            .profiles
            .get(id)
            .cloned()
            .ok_or_else(|| DeviceError::ProfileNotFound(id.clone()))
    }
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineProfileProvider for DeviceManager {
    fn axis_speeds(&self) -> DeviceResult<AxisSpeeds> {
        Ok(self.active_profile()?.speeds())
    }

    fn outside_build_volume(&self, bbox: &BoundingBox) -> Vec<Axis> {
        self.active_profile()
            .map(|profile| profile.axes_outside_volume(bbox))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_profile_speeds() {
        let mut profile = DeviceProfile::new("mill", "Desktop Mill");
        profile.z_axis.speed = 400.0;
        let manager = DeviceManager::with_profile(profile).unwrap();

        let speeds = manager.axis_speeds().unwrap();
        assert_eq!(speeds.z, 400.0);
    }

    #[test]
    fn test_no_active_profile() {
        let manager = DeviceManager::new();
        manager
            .add_profile(DeviceProfile::new("laser", "Laser"))
            .unwrap();
        assert!(matches!(
            manager.axis_speeds(),
            Err(DeviceError::NoActiveProfile)
        ));
    }

    #[test]
    fn test_duplicate_and_missing_profiles() {
        let manager = DeviceManager::new();
        manager.add_profile(DeviceProfile::new("a", "A")).unwrap();
        assert!(matches!(
            manager.add_profile(DeviceProfile::new("a", "Again")),
            Err(DeviceError::ProfileAlreadyExists(_))
        ));
        assert!(matches!(
            manager.set_active("b"),
            Err(DeviceError::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_volume_check_uses_active_profile() {
        let manager = DeviceManager::new();
        let bbox = BoundingBox::planar(
            workarea_core::AxisRange::new(0.0, 500.0),
            workarea_core::AxisRange::new(0.0, 10.0),
        );
        assert!(manager.outside_build_volume(&bbox).is_empty());

        let manager = DeviceManager::with_profile(DeviceProfile::new("a", "A")).unwrap();
        assert_eq!(manager.outside_build_volume(&bbox), vec![Axis::X]);
    }

    #[test]
    fn test_removing_active_profile_clears_selection() {
        let manager = DeviceManager::with_profile(DeviceProfile::new("a", "A")).unwrap();
        manager.remove_profile("a").unwrap();
        assert_eq!(manager.profile_count(), 0);
        assert!(matches!(
            manager.active_profile(),
            Err(DeviceError::NoActiveProfile)
        ));
    }
}
