//! Motion commands
//!
//! The small set of G-code lines an outline needs. Coordinates are written
//! with four decimals; feed rates are written as given.

use std::fmt;

/// Axes homed before outlining
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeAxes {
    Xy,
    Xyz,
}

impl HomeAxes {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xy => "XY",
            Self::Xyz => "XYZ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    /// `G28`
    Home(HomeAxes),
    /// `G90`
    AbsolutePositioning,
    /// Rapid move of Z only
    RapidZ { z: f64, feed: f64 },
    /// Rapid move in the XY plane
    RapidXy { x: f64, y: f64, feed: f64 },
}

impl MotionCommand {
    pub fn to_gcode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home(axes) => write!(f, "G28 {}", axes.as_str()),
            Self::AbsolutePositioning => write!(f, "G90"),
            Self::RapidZ { z, feed } => write!(f, "G0 Z{:.4} F{}", z, feed),
            Self::RapidXy { x, y, feed } => write!(f, "G0 X{:.4} Y{:.4} F{}", x, y, feed),
        }
    }
}
