//! Outline configuration
//!
//! The persisted settings that control how a work area is traced. Keys use the
//! camelCase names of the stored schema so existing settings files load
//! unchanged. Missing keys take their defaults; unknown mode strings are
//! rejected rather than replaced with a default.

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Where outline feed rates come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedrateSource {
    /// Machine profile travel speeds
    #[default]
    Auto,
    /// `customFeedrateXY` / `customFeedrateZ`
    Custom,
}

impl fmt::Display for FeedrateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for FeedrateSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("unknown feed rate source '{}'", s)),
        }
    }
}

/// XY position after the outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XyEndMode {
    /// Position captured before outlining
    #[default]
    Restore,
    /// Centre of the work area
    Center,
    /// Machine origin
    Home,
    /// `xParkCoord` / `yParkCoord`
    Park,
}

impl fmt::Display for XyEndMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restore => write!(f, "restore"),
            Self::Center => write!(f, "center"),
            Self::Home => write!(f, "home"),
            Self::Park => write!(f, "park"),
        }
    }
}

impl FromStr for XyEndMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restore" => Ok(Self::Restore),
            "center" => Ok(Self::Center),
            "home" => Ok(Self::Home),
            "park" => Ok(Self::Park),
            _ => Err(format!("unknown XY end mode '{}'", s)),
        }
    }
}

/// Z position after the outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZEndMode {
    /// Position captured before outlining
    #[default]
    Restore,
    /// Top of the work area
    Max,
    /// Machine origin
    Home,
    /// `zParkCoord`
    Park,
}

impl fmt::Display for ZEndMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restore => write!(f, "restore"),
            Self::Max => write!(f, "max"),
            Self::Home => write!(f, "home"),
            Self::Park => write!(f, "park"),
        }
    }
}

impl FromStr for ZEndMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restore" => Ok(Self::Restore),
            "max" => Ok(Self::Max),
            "home" => Ok(Self::Home),
            "park" => Ok(Self::Park),
            _ => Err(format!("unknown Z end mode '{}'", s)),
        }
    }
}

/// Complete outline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutlinerSettings {
    /// Move Z during the outline
    pub z_axis_enable: bool,
    /// Home before tracing
    pub home_first: bool,
    pub feedrate_src: FeedrateSource,
    #[serde(rename = "customFeedrateXY")]
    pub custom_feedrate_xy: f64,
    #[serde(rename = "customFeedrateZ")]
    pub custom_feedrate_z: f64,
    pub xy_end_mode: XyEndMode,
    pub z_end_mode: ZEndMode,
    /// Stored for the settings UI; not used when planning
    pub xy_park_position: String,
    /// Stored for the settings UI; not used when planning
    pub z_park_position: String,
    pub x_park_coord: f64,
    pub y_park_coord: f64,
    pub z_park_coord: f64,
    /// Skip the slicer metadata scan
    pub ignore_metadata: bool,
    // Persisted for compatibility with existing settings files.
    pub ignore_travel_moves: bool,
    pub wait_for_first_layer: bool,
    pub stop_after_first_layer: bool,
}

impl Default for OutlinerSettings {
    fn default() -> Self {
        Self {
            z_axis_enable: false,
            home_first: true,
            feedrate_src: FeedrateSource::Auto,
            custom_feedrate_xy: 3000.0,
            custom_feedrate_z: 300.0,
            xy_end_mode: XyEndMode::Restore,
            z_end_mode: ZEndMode::Restore,
            xy_park_position: "min_min".to_string(),
            z_park_position: "nearbed".to_string(),
            x_park_coord: 10.0,
            y_park_coord: 10.0,
            z_park_coord: 10.0,
            ignore_metadata: false,
            ignore_travel_moves: true,
            wait_for_first_layer: true,
            stop_after_first_layer: true,
        }
    }
}

impl OutlinerSettings {
    /// Keys accepted by [`OutlinerSettings::set_value`]
    pub const KEYS: [&'static str; 16] = [
        "zAxisEnable",
        "homeFirst",
        "feedrateSrc",
        "customFeedrateXY",
        "customFeedrateZ",
        "xyEndMode",
        "zEndMode",
        "xyParkPosition",
        "zParkPosition",
        "xParkCoord",
        "yParkCoord",
        "zParkCoord",
        "ignoreMetadata",
        "ignoreTravelMoves",
        "waitForFirstLayer",
        "stopAfterFirstLayer",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let settings: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::LoadError(
                "Settings file must be .json or .toml".to_string(),
            ));
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(SettingsError::SaveError(
                "Settings file must be .json or .toml".to_string(),
            ));
        };

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Settings rendered as a TOML document
    pub fn to_toml_string(&self) -> SettingsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate numeric settings
    pub fn validate(&self) -> SettingsResult<()> {
        // Custom feed rates are only read when they are selected
        if self.feedrate_src == FeedrateSource::Custom {
            for (key, value) in [
                ("customFeedrateXY", self.custom_feedrate_xy),
                ("customFeedrateZ", self.custom_feedrate_z),
            ] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(SettingsError::invalid(key, "feed rate must be > 0"));
                }
            }
        }

        for (key, value) in [
            ("xParkCoord", self.x_park_coord),
            ("yParkCoord", self.y_park_coord),
            ("zParkCoord", self.z_park_coord),
        ] {
            if !value.is_finite() {
                return Err(SettingsError::invalid(key, "coordinate must be finite"));
            }
        }

        Ok(())
    }

    /// Apply a single key→value update using the stored key names
    pub fn set_value(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        let value = value.trim();
        let mut updated = self.clone();
        match key {
            "zAxisEnable" => updated.z_axis_enable = parse_bool(key, value)?,
            "homeFirst" => updated.home_first = parse_bool(key, value)?,
            "feedrateSrc" => updated.feedrate_src = parse_enum(key, value)?,
            "customFeedrateXY" => updated.custom_feedrate_xy = parse_number(key, value)?,
            "customFeedrateZ" => updated.custom_feedrate_z = parse_number(key, value)?,
            "xyEndMode" => updated.xy_end_mode = parse_enum(key, value)?,
            "zEndMode" => updated.z_end_mode = parse_enum(key, value)?,
            "xyParkPosition" => updated.xy_park_position = value.to_string(),
            "zParkPosition" => updated.z_park_position = value.to_string(),
            "xParkCoord" => updated.x_park_coord = parse_number(key, value)?,
            "yParkCoord" => updated.y_park_coord = parse_number(key, value)?,
            "zParkCoord" => updated.z_park_coord = parse_number(key, value)?,
            "ignoreMetadata" => updated.ignore_metadata = parse_bool(key, value)?,
            "ignoreTravelMoves" => updated.ignore_travel_moves = parse_bool(key, value)?,
            "waitForFirstLayer" => updated.wait_for_first_layer = parse_bool(key, value)?,
            "stopAfterFirstLayer" => updated.stop_after_first_layer = parse_bool(key, value)?,
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> SettingsResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::invalid(
            key,
            format!("expected a boolean, got '{}'", value),
        )),
    }
}

fn parse_number(key: &str, value: &str) -> SettingsResult<f64> {
    value
        .parse::<f64>()
        .map_err(|_| SettingsError::invalid(key, format!("expected a number, got '{}'", value)))
}

fn parse_enum<T: FromStr<Err = String>>(key: &str, value: &str) -> SettingsResult<T> {
    value.parse().map_err(|e: String| SettingsError::invalid(key, e))
}
