//! Bounding box model
//!
//! A job's work area is an axis-aligned box with a (min, max) extent for each
//! of X, Y and Z. Sources that only describe the XY plane leave Z at (0, 0).
//!
//! The box serializes as `{"X": [min, max], "Y": [min, max], "Z": [min, max]}`,
//! which is the payload returned by the `outline` command.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Spatial axis of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in X, Y, Z order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// G-code word letter for this axis
    pub fn letter(&self) -> char {
        match self {
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Extent of a box along one axis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range covering a single value
    pub fn point(value: f64) -> Self {
        Self::new(value, value)
    }

    /// Range of `size` centred on `center`
    pub fn from_center(center: f64, size: f64) -> Self {
        Self::new(center - size / 2.0, center + size / 2.0)
    }

    /// Both ends are finite and `min <= max`
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    /// Grow the range so it contains `value`
    pub fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

impl From<(f64, f64)> for AxisRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

impl From<AxisRange> for (f64, f64) {
    fn from(range: AxisRange) -> Self {
        (range.min, range.max)
    }
}

/// Axis-aligned work area of a job
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "X")]
    pub x: AxisRange,
    #[serde(rename = "Y")]
    pub y: AxisRange,
    #[serde(rename = "Z")]
    pub z: AxisRange,
}

impl BoundingBox {
    pub fn new(x: AxisRange, y: AxisRange, z: AxisRange) -> Self {
        Self { x, y, z }
    }

    /// Box for a source that only describes the XY plane; Z is (0, 0)
    pub fn planar(x: AxisRange, y: AxisRange) -> Self {
        Self::new(x, y, AxisRange::point(0.0))
    }

    /// Extent along `axis`
    pub fn range(&self, axis: Axis) -> AxisRange {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Every axis is finite with `min <= max`
    pub fn is_valid(&self) -> bool {
        Axis::ALL.iter().all(|axis| self.range(*axis).is_valid())
    }

    /// Three-line summary used in success notifications
    pub fn summary(&self) -> String {
        Axis::ALL
            .iter()
            .map(|axis| {
                let range = self.range(*axis);
                format!("{} = {:.3}  to  {:.3}", axis, range.min, range.max)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X{:.4} to X{:.4} | Y{:.4} to Y{:.4} | Z{:.4} to Z{:.4}",
            self.x.min, self.x.max, self.y.min, self.y.max, self.z.min, self.z.max
        )
    }
}

/// Machine position in absolute coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Machine origin (0, 0, 0)
    pub fn origin() -> Self {
        Self::default()
    }
}
