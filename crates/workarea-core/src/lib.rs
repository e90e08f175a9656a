//! # WorkArea Core
//!
//! Core types and host capabilities for the work area outliner.
//! Provides the bounding box model shared by the resolver and the planner,
//! the unified error type, and the file-management seams through which a
//! host exposes the active job and its stored analysis.

pub mod error;
pub mod geometry;
pub mod host;

pub use error::{Error, MetadataError, Result};
pub use geometry::{Axis, AxisRange, BoundingBox, Position};
pub use host::{
    Analysis, AnalysisStore, FileMetadata, JobLocator, JobRef, LocalJobLocator, MetadataFileStore,
    PrintingArea, StorageLocation, METADATA_FILE_NAME,
};
