use crate::error::DeviceResult;
use workarea_core::{Axis, BoundingBox};

/// Configured travel speed per axis, in units per minute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpeeds {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Exposes the active machine's axis travel speeds and work volume
pub trait MachineProfileProvider: Send + Sync {
    fn axis_speeds(&self) -> DeviceResult<AxisSpeeds>;

    /// Axes along which `bbox` leaves the machine's reachable volume.
    /// Providers that know nothing about the volume report none.
    fn outside_build_volume(&self, _bbox: &BoundingBox) -> Vec<Axis> {
        Vec::new()
    }
}
