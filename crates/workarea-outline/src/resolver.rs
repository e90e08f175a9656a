//! Bounding Box Resolver
//!
//! Three independent sources can describe a job's extents:
//!
//! 1. the analysis the host stored for the file,
//! 2. metadata a vendor tool wrote into the file header,
//! 3. a full scan of the file's motion path.
//!
//! They are not tried as a plain first-match chain. The host analysis is read
//! first. When metadata is not ignored and the file is on disk, the header scan
//! result replaces it, even when the scan finds nothing. The geometry scan runs
//! only if nothing is left by that point.

use std::path::Path;
use std::sync::Arc;

use workarea_core::{AnalysisStore, BoundingBox, JobLocator, JobRef};
use workarea_gcode::{DialectPipeline, GcodeExtentsAnalyzer, GeometryAnalyzer};

use crate::error::{OutlineError, OutlineResult};

/// Where a resolved box came from
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionSource {
    HostAnalysis,
    /// Header metadata written by the named tool
    Metadata(String),
    Geometry,
}

impl std::fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HostAnalysis => write!(f, "host analysis"),
            Self::Metadata(source) => write!(f, "{} metadata", source),
            Self::Geometry => write!(f, "geometry scan"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub bbox: BoundingBox,
    pub source: ResolutionSource,
}

pub struct BoundingBoxResolver {
    locator: Arc<dyn JobLocator>,
    store: Arc<dyn AnalysisStore>,
    dialects: DialectPipeline,
    analyzer: Arc<dyn GeometryAnalyzer>,
}

impl BoundingBoxResolver {
    /// Resolver with the built-in dialects and geometry analyzer
    pub fn new(locator: Arc<dyn JobLocator>, store: Arc<dyn AnalysisStore>) -> Self {
        Self {
            locator,
            store,
            dialects: DialectPipeline::with_defaults(),
            analyzer: Arc::new(GcodeExtentsAnalyzer::new()),
        }
    }

    pub fn with_dialects(mut self, dialects: DialectPipeline) -> Self {
        self.dialects = dialects;
        self
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn GeometryAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Bounding box of `job`
    ///
    /// # Errors
    /// [`OutlineError::MetadataUnavailable`] when no source yields a box.
    pub fn resolve(&self, job: &JobRef, ignore_metadata: bool) -> OutlineResult<BoundingBox> {
        self.resolve_with_source(job, ignore_metadata)
            .map(|resolution| resolution.bbox)
    }

    /// Like [`resolve`](Self::resolve), also reporting which source won
    pub fn resolve_with_source(
        &self,
        job: &JobRef,
        ignore_metadata: bool,
    ) -> OutlineResult<Resolution> {
        let path = match self.locator.path_on_disk(job.location, &job.filename) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("No local path for {}: {}", job.filename, e);
                None
            }
        };

        let mut resolved = self.from_host_analysis(job);

        if !ignore_metadata {
            if let Some(path) = path.as_deref() {
                resolved = self.from_header(path);
            }
        }

        if resolved.is_none() {
            resolved = path.as_deref().and_then(|p| self.from_geometry(p));
        }

        match resolved {
            Some(resolution) => {
                tracing::debug!("Found Work Area: {}", resolution.bbox);
                Ok(resolution)
            }
            None => {
                tracing::error!("Error, Could not find work area");
                Err(OutlineError::MetadataUnavailable)
            }
        }
    }

    fn from_host_analysis(&self, job: &JobRef) -> Option<Resolution> {
        let metadata = self.store.get_metadata(job.location, &job.filename);
        let Some(area) = metadata.as_ref().and_then(|m| m.printing_area()) else {
            tracing::debug!("Could not find host analysis. File too new?");
            return None;
        };

        // maxX of exactly 0 marks an analysis that never completed
        if area.max_x == 0.0 {
            tracing::debug!("Host analysis invalid (maxX == 0)");
            return None;
        }

        let bbox = area.to_bounding_box();
        if !bbox.is_valid() {
            tracing::debug!("Host analysis has inverted extents: {}", bbox);
            return None;
        }

        tracing::info!("Using Printing Area from host analysis");
        Some(Resolution {
            bbox,
            source: ResolutionSource::HostAnalysis,
        })
    }

    fn from_header(&self, path: &Path) -> Option<Resolution> {
        match self.dialects.scan_file(path) {
            Ok(found) => found.map(|m| Resolution {
                bbox: m.bbox,
                source: ResolutionSource::Metadata(m.source),
            }),
            Err(e) => {
                tracing::warn!("Could not read header of {}: {}", path.display(), e);
                None
            }
        }
    }

    fn from_geometry(&self, path: &Path) -> Option<Resolution> {
        match self.analyzer.analyze(path) {
            Ok(bbox) if bbox.is_valid() => {
                tracing::info!("Using Work Area from geometry analysis");
                Some(Resolution {
                    bbox,
                    source: ResolutionSource::Geometry,
                })
            }
            Ok(bbox) => {
                tracing::warn!("Geometry analysis produced invalid extents: {}", bbox);
                None
            }
            Err(e) => {
                tracing::warn!("Geometry analysis failed: {}", e);
                None
            }
        }
    }
}
