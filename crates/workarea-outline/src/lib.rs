//! # WorkArea Outline
//!
//! Finds the work area of the selected job and traces its outline on the
//! machine.
//!
//! - [`BoundingBoxResolver`] layers host analysis, vendor header metadata and
//!   a full geometry scan to produce a [`BoundingBox`](workarea_core::BoundingBox).
//! - [`OutlinePlanner`] turns a box and a settings snapshot into motion
//!   commands and submits them.
//! - [`OutlineService`] is the `outline` command entry point tying both
//!   together under a single-flight guard.

pub mod error;
pub mod planner;
pub mod resolver;
pub mod service;

pub use error::{OutlineError, OutlineResult};
pub use planner::{
    end_position, outline_points, FeedRates, OutlinePlan, OutlinePlanner, NEAR_BED_HEIGHT,
    TRAVEL_HEIGHT,
};
pub use resolver::{BoundingBoxResolver, Resolution, ResolutionSource};
pub use service::{OutlineResponse, OutlineService, OUTLINE_COMMAND};
