//! Vendor metadata dialects
//!
//! Laser, CAM and slicer tools write the extents of a job into header
//! comments, each in its own format. A [`DialectPipeline`] tries registered
//! dialects in order against the first [`HEADER_SIZE`](crate::HEADER_SIZE)
//! bytes of a file and returns the first usable match.

mod fusion360;
mod lightburn;
mod slic3r;

pub use fusion360::Fusion360Dialect;
pub use lightburn::LightBurnDialect;
pub use slic3r::Slic3rDialect;

use std::path::Path;
use std::sync::Arc;

use workarea_core::BoundingBox;

use crate::error::GcodeResult;
use crate::file_io::GcodeFileReader;

/// Result of a successful dialect detection
#[derive(Debug, Clone, PartialEq)]
pub struct DialectMatch {
    /// Tool that wrote the metadata, e.g. `LightBurn` or `PrusaSlicer`
    pub source: String,
    pub bbox: BoundingBox,
}

/// A header comment format that carries job extents
///
/// `detect` returns `Ok(None)` when the header carries no trace of the
/// dialect, and an error when the dialect is recognised but its values cannot
/// be read.
pub trait MetadataDialect: Send + Sync {
    /// Short identifier of the dialect
    fn name(&self) -> &str;

    fn detect(&self, header: &str) -> GcodeResult<Option<DialectMatch>>;
}

pub type DialectHandle = Arc<dyn MetadataDialect>;

/// Ordered list of dialects tried against a file header
pub struct DialectPipeline {
    dialects: Vec<DialectHandle>,
}

impl DialectPipeline {
    /// Empty pipeline
    pub fn new() -> Self {
        Self {
            dialects: Vec::new(),
        }
    }

    /// Pipeline with the built-in dialects in priority order:
    /// LightBurn bounds line, Fusion 360 ranges table, Slic3r plater record
    pub fn with_defaults() -> Self {
        let mut pipeline = Self::new();
        pipeline
            .register(Arc::new(LightBurnDialect::new()))
            .register(Arc::new(Fusion360Dialect::new()))
            .register(Arc::new(Slic3rDialect::new()));
        pipeline
    }

    /// Append a dialect at the lowest priority
    pub fn register(&mut self, dialect: DialectHandle) -> &mut Self {
        self.dialects.push(dialect);
        self
    }

    pub fn list_dialects(&self) -> Vec<&str> {
        self.dialects.iter().map(|d| d.name()).collect()
    }

    /// First dialect in priority order that yields a valid box
    ///
    /// Malformed metadata and inverted boxes are logged and skipped so a later
    /// dialect, or a later resolution strategy, can still succeed.
    pub fn scan(&self, header: &str) -> Option<DialectMatch> {
        for dialect in &self.dialects {
            match dialect.detect(header) {
                Ok(Some(found)) if found.bbox.is_valid() => {
                    tracing::info!("Using Work Area from {} Metadata", found.source);
                    return Some(found);
                }
                Ok(Some(found)) => {
                    tracing::warn!(
                        "Ignoring {} metadata with invalid extents: {}",
                        found.source,
                        found.bbox
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("{}", e);
                }
            }
        }

        tracing::warn!("Could not find slicer metadata. Unsupported program?");
        None
    }

    /// Read the header of `path` and scan it
    pub fn scan_file(&self, path: &Path) -> GcodeResult<Option<DialectMatch>> {
        let header = GcodeFileReader::new(path)?.read_header()?;
        Ok(self.scan(&header))
    }
}

impl Default for DialectPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for DialectPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectPipeline")
            .field("dialects", &self.list_dialects())
            .finish()
    }
}

/// Parse a numeric capture, reporting the field on failure
pub(crate) fn parse_number(dialect: &str, field: &str, text: &str) -> GcodeResult<f64> {
    text.parse::<f64>().map_err(|_| {
        crate::error::GcodeError::malformed(dialect, format!("{} is not a number: {:?}", field, text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GcodeError;
    use workarea_core::AxisRange;

    struct FixedDialect {
        result: fn() -> GcodeResult<Option<DialectMatch>>,
    }

    impl MetadataDialect for FixedDialect {
        fn name(&self) -> &str {
            "fixed"
        }

        fn detect(&self, _header: &str) -> GcodeResult<Option<DialectMatch>> {
            (self.result)()
        }
    }

    fn found(min: f64, max: f64) -> GcodeResult<Option<DialectMatch>> {
        Ok(Some(DialectMatch {
            source: "Fixed".to_string(),
            bbox: BoundingBox::planar(AxisRange::new(min, max), AxisRange::new(0.0, 1.0)),
        }))
    }

    #[test]
    fn test_default_order() {
        let pipeline = DialectPipeline::with_defaults();
        assert_eq!(
            pipeline.list_dialects(),
            vec!["lightburn", "fusion360", "slic3r"]
        );
    }

    #[test]
    fn test_first_match_wins() {
        let header = "; Bounds: X1 Y2 to X3 Y4\n; X: Min=-0.5 Max=63.4 Size=63.9\n; Y: Min=-0.5 Max=25.4 Size=25.9\n";
        let found = DialectPipeline::with_defaults().scan(header).unwrap();
        assert_eq!(found.source, "LightBurn");
        assert_eq!(found.bbox.x, AxisRange::new(1.0, 3.0));
    }

    #[test]
    fn test_malformed_falls_through() {
        let mut pipeline = DialectPipeline::new();
        pipeline
            .register(Arc::new(FixedDialect {
                result: || Err(GcodeError::malformed("fixed", "broken")),
            }))
            .register(Arc::new(FixedDialect {
                result: || found(1.0, 2.0),
            }));

        let found = pipeline.scan("").unwrap();
        assert_eq!(found.bbox.x, AxisRange::new(1.0, 2.0));
    }

    #[test]
    fn test_inverted_box_falls_through() {
        let mut pipeline = DialectPipeline::new();
        pipeline
            .register(Arc::new(FixedDialect {
                result: || found(5.0, 1.0),
            }))
            .register(Arc::new(FixedDialect {
                result: || found(1.0, 5.0),
            }));

        let found = pipeline.scan("").unwrap();
        assert_eq!(found.bbox.x, AxisRange::new(1.0, 5.0));
    }

    #[test]
    fn test_no_match() {
        let header = "; generated by Cura\nG28\nG1 X10 Y10\n";
        assert!(DialectPipeline::with_defaults().scan(header).is_none());
    }
}
