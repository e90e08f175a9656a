//! Outline Motion Planner
//!
//! Everything up to the final submit is a pure function of the bounding box,
//! the settings snapshot, the machine profile and the start position, so a
//! plan is fully built before the first command leaves.

use std::sync::Arc;

use workarea_communication::{HomeAxes, MotionCommand, MotionTransport};
use workarea_core::{BoundingBox, Position};
use workarea_devicedb::MachineProfileProvider;
use workarea_settings::{FeedrateSource, OutlinerSettings, XyEndMode, ZEndMode};

use crate::error::OutlineResult;

/// Z height for moves that must clear the work surface
pub const TRAVEL_HEIGHT: f64 = 10.0;

/// Z height held while tracing the outline
pub const NEAR_BED_HEIGHT: f64 = 5.0;

/// Feed rates in units per minute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedRates {
    pub xy: f64,
    pub z: f64,
}

impl FeedRates {
    /// Feed rates chosen by the settings
    ///
    /// `auto` takes the slower of the X and Y travel speeds and the Z travel
    /// speed of the active machine profile. Values are used as-is.
    pub fn resolve(
        settings: &OutlinerSettings,
        profile: &dyn MachineProfileProvider,
    ) -> OutlineResult<Self> {
        match settings.feedrate_src {
            FeedrateSource::Auto => {
                let speeds = profile.axis_speeds()?;
                Ok(Self {
                    xy: speeds.x.min(speeds.y),
                    z: speeds.z,
                })
            }
            FeedrateSource::Custom => Ok(Self {
                xy: settings.custom_feedrate_xy,
                z: settings.custom_feedrate_z,
            }),
        }
    }
}

/// Where the head rests once the outline is done
pub fn end_position(settings: &OutlinerSettings, bbox: &BoundingBox, initial: Position) -> Position {
    let (x, y) = match settings.xy_end_mode {
        XyEndMode::Center => (bbox.x.center(), bbox.y.center()),
        XyEndMode::Home => (0.0, 0.0),
        XyEndMode::Park => (settings.x_park_coord, settings.y_park_coord),
        XyEndMode::Restore => (initial.x, initial.y),
    };

    let z = match settings.z_end_mode {
        ZEndMode::Max => bbox.z.max,
        ZEndMode::Home => 0.0,
        ZEndMode::Park => settings.z_park_coord,
        ZEndMode::Restore => initial.z,
    };

    Position::new(x, y, z)
}

/// Rectangle corners in tracing order: min/min, min/max, max/max, max/min
pub fn outline_points(bbox: &BoundingBox) -> [(f64, f64); 4] {
    [
        (bbox.x.min, bbox.y.min),
        (bbox.x.min, bbox.y.max),
        (bbox.x.max, bbox.y.max),
        (bbox.x.max, bbox.y.min),
    ]
}

/// A fully resolved outline, ready to submit
#[derive(Debug, Clone, PartialEq)]
pub struct OutlinePlan {
    pub feed_rates: FeedRates,
    pub end_position: Position,
    pub corners: [(f64, f64); 4],
    pub commands: Vec<MotionCommand>,
}

impl OutlinePlan {
    pub fn build(
        bbox: &BoundingBox,
        settings: &OutlinerSettings,
        feed_rates: FeedRates,
        initial: Position,
    ) -> Self {
        let end = end_position(settings, bbox, initial);
        let corners = outline_points(bbox);
        let z_enabled = settings.z_axis_enable;
        let rapid_z = |z: f64| MotionCommand::RapidZ {
            z,
            feed: feed_rates.z,
        };
        let rapid_xy = |(x, y): (f64, f64)| MotionCommand::RapidXy {
            x,
            y,
            feed: feed_rates.xy,
        };

        let mut commands = Vec::with_capacity(13);

        if settings.home_first {
            commands.push(MotionCommand::Home(if z_enabled {
                HomeAxes::Xyz
            } else {
                HomeAxes::Xy
            }));
        }
        commands.push(MotionCommand::AbsolutePositioning);
        if z_enabled {
            commands.push(rapid_z(TRAVEL_HEIGHT));
        }

        commands.push(rapid_xy(corners[0]));
        if z_enabled {
            commands.push(rapid_z(NEAR_BED_HEIGHT));
        }
        for corner in corners[1..].iter().chain(std::iter::once(&corners[0])) {
            commands.push(rapid_xy(*corner));
        }

        if z_enabled {
            commands.push(rapid_z(TRAVEL_HEIGHT));
        }
        commands.push(rapid_xy((end.x, end.y)));
        if z_enabled {
            commands.push(rapid_z(end.z));
        }

        Self {
            feed_rates,
            end_position: end,
            corners,
            commands,
        }
    }

    /// Commands as G-code lines
    pub fn lines(&self) -> Vec<String> {
        self.commands.iter().map(MotionCommand::to_gcode).collect()
    }
}

pub struct OutlinePlanner {
    profile: Arc<dyn MachineProfileProvider>,
}

impl OutlinePlanner {
    pub fn new(profile: Arc<dyn MachineProfileProvider>) -> Self {
        Self { profile }
    }

    /// Build the plan without submitting anything
    pub fn plan(
        &self,
        bbox: &BoundingBox,
        settings: &OutlinerSettings,
        initial: Position,
    ) -> OutlineResult<OutlinePlan> {
        let feed_rates = FeedRates::resolve(settings, self.profile.as_ref())?;
        Ok(OutlinePlan::build(bbox, settings, feed_rates, initial))
    }

    /// Plan the outline and submit it in order
    pub fn plan_and_execute(
        &self,
        bbox: &BoundingBox,
        settings: &OutlinerSettings,
        transport: &dyn MotionTransport,
    ) -> OutlineResult<OutlinePlan> {
        tracing::info!("Outlining Work Area");

        let initial = transport.current_position().unwrap_or_else(Position::origin);
        let plan = self.plan(bbox, settings, initial)?;

        for command in &plan.commands {
            transport.submit(&command.to_gcode());
        }
        Ok(plan)
    }

    pub fn profile(&self) -> &dyn MachineProfileProvider {
        self.profile.as_ref()
    }
}
