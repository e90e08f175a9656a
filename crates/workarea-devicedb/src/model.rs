use serde::{Deserialize, Serialize};
use uuid::Uuid;
use workarea_core::{Axis, BoundingBox};

use crate::error::{DeviceError, DeviceResult};
use crate::traits::{AxisSpeeds, MachineProfileProvider};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AxisProfile {
    /// Travel speed in units per minute
    pub speed: f64,
}

impl AxisProfile {
    pub fn with_speed(speed: f64) -> Self {
        Self { speed }
    }
}

/// Usable work volume starting at the origin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildVolume {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

impl Default for BuildVolume {
    fn default() -> Self {
        Self {
            width: 200.0,
            depth: 200.0,
            height: 200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub id: String,
    pub name: String,

    pub volume: BuildVolume,

    // Per-axis motion
    pub x_axis: AxisProfile,
    pub y_axis: AxisProfile,
    pub z_axis: AxisProfile,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "New Device".to_string(),
            volume: BuildVolume::default(),
            x_axis: AxisProfile::with_speed(6000.0),
            y_axis: AxisProfile::with_speed(6000.0),
            z_axis: AxisProfile::with_speed(200.0),
        }
    }
}

impl DeviceProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> DeviceResult<()> {
        if self.id.trim().is_empty() {
            return Err(DeviceError::InvalidProfile("id must not be empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(DeviceError::InvalidProfile(format!(
                "profile {} has no name",
                self.id
            )));
        }
        Ok(())
    }

    pub fn speeds(&self) -> AxisSpeeds {
        AxisSpeeds {
            x: self.x_axis.speed,
            y: self.y_axis.speed,
            z: self.z_axis.speed,
        }
    }

    /// Axes along which `bbox` leaves the build volume
    pub fn axes_outside_volume(&self, bbox: &BoundingBox) -> Vec<Axis> {
        Axis::ALL
            .into_iter()
            .filter(|axis| {
                let limit = match axis {
                    Axis::X => self.volume.width,
                    Axis::Y => self.volume.depth,
                    Axis::Z => self.volume.height,
                };
                let range = bbox.range(*axis);
                range.min < 0.0 || range.max > limit
            })
            .collect()
    }
}

impl MachineProfileProvider for DeviceProfile {
    fn axis_speeds(&self) -> DeviceResult<AxisSpeeds> {
        Ok(self.speeds())
    }

    fn outside_build_volume(&self, bbox: &BoundingBox) -> Vec<Axis> {
        self.axes_outside_volume(bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workarea_core::AxisRange;

    #[test]
    fn test_default_speeds() {
        let profile = DeviceProfile::default();
        let speeds = profile.axis_speeds().unwrap();
        assert_eq!(speeds.x, 6000.0);
        assert_eq!(speeds.y, 6000.0);
        assert_eq!(speeds.z, 200.0);
    }

    #[test]
    fn test_partial_profile_json() {
        let profile: DeviceProfile = serde_json::from_str(
            r#"{"id": "ender3", "name": "Ender 3", "y_axis": {"speed": 4800.0}}"#,
        )
        .unwrap();
        assert_eq!(profile.id, "ender3");
        assert_eq!(profile.y_axis.speed, 4800.0);
        assert_eq!(profile.x_axis.speed, 6000.0);
    }

    #[test]
    fn test_validate() {
        assert!(DeviceProfile::new("a", "A").validate().is_ok());
        assert!(DeviceProfile::new(" ", "A").validate().is_err());
        assert!(DeviceProfile::new("a", "").validate().is_err());
    }

    #[test]
    fn test_axes_outside_volume() {
        let profile = DeviceProfile::default();
        let inside = BoundingBox::planar(AxisRange::new(10.0, 190.0), AxisRange::new(0.0, 200.0));
        assert!(profile.axes_outside_volume(&inside).is_empty());

        let outside = BoundingBox::new(
            AxisRange::new(-5.0, 100.0),
            AxisRange::new(0.0, 250.0),
            AxisRange::new(0.0, 10.0),
        );
        assert_eq!(
            profile.axes_outside_volume(&outside),
            vec![Axis::X, Axis::Y]
        );
    }
}
