use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use workarea_core::{AxisRange, BoundingBox};

use super::{DialectMatch, MetadataDialect};
use crate::error::{GcodeError, GcodeResult};

const NAME: &str = "slic3r";

/// Slic3r family plater record
///
/// Written by Slic3r, PrusaSlicer and SuperSlicer after their signature line:
///
/// ```text
/// ; generated by PrusaSlicer 2.6.0 on 2023-09-01 at 10:00:00 UTC
/// ; plater:{"center":[237.5,149.99,0.0],"boundingbox_center":[237.5,149.99,4.5],"boundingbox_size":[53.0,56.42,9.0]}
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Slic3rDialect;

impl Slic3rDialect {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct PlaterRecord {
    center: [f64; 3],
    boundingbox_center: [f64; 3],
    boundingbox_size: [f64; 3],
}

impl PlaterRecord {
    fn to_bounding_box(&self) -> BoundingBox {
        let [cx, cy, _] = self.boundingbox_center;
        let [sx, sy, sz] = self.boundingbox_size;
        let base_z = self.center[2];
        BoundingBox::new(
            AxisRange::from_center(cx, sx),
            AxisRange::from_center(cy, sy),
            AxisRange::new(base_z, base_z + sz),
        )
    }
}

fn signature() -> &'static Regex {
    static SIGNATURE_REGEX: OnceLock<Regex> = OnceLock::new();
    SIGNATURE_REGEX.get_or_init(|| {
        Regex::new(r"; generated by (Slic3r|(?:Super|Prusa)Slicer)\b").expect("invalid regex pattern")
    })
}

fn plater_line() -> &'static Regex {
    static PLATER_REGEX: OnceLock<Regex> = OnceLock::new();
    PLATER_REGEX
        .get_or_init(|| Regex::new(r"; plater:\s*([^\r\n]*)").expect("invalid regex pattern"))
}

impl MetadataDialect for Slic3rDialect {
    fn name(&self) -> &str {
        NAME
    }

    fn detect(&self, header: &str) -> GcodeResult<Option<DialectMatch>> {
        let Some(generator) = signature().captures(header) else {
            return Ok(None);
        };
        let source = generator[1].to_string();

        let record = plater_line()
            .captures(header)
            .ok_or_else(|| GcodeError::malformed(NAME, format!("{} header has no plater record", source)))?;

        let plater: PlaterRecord = serde_json::from_str(record[1].trim())
            .map_err(|e| GcodeError::malformed(NAME, format!("plater record: {}", e)))?;

        Ok(Some(DialectMatch {
            source,
            bbox: plater.to_bounding_box(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "; generated by PrusaSlicer 2.6.0+linux-x64 on 2023-09-01 at 10:00:00 UTC\n\n; \n; plater:{\"center\":[237.500000,149.999579,0.000000],\"boundingbox_center\":[237.500000,149.999579,4.500000],\"boundingbox_size\":[53.000000,56.424981,9.000000]}\n\nM73 P0 R12\n";

    #[test]
    fn test_plater_record() {
        let found = Slic3rDialect::new().detect(HEADER).unwrap().unwrap();
        assert_eq!(found.source, "PrusaSlicer");

        let bbox = found.bbox;
        assert!((bbox.x.min - 211.0).abs() < 0.01);
        assert!((bbox.x.max - 264.0).abs() < 0.01);
        assert!((bbox.y.min - 121.787).abs() < 0.01);
        assert!((bbox.y.max - 178.212).abs() < 0.01);
        assert_eq!(bbox.z, AxisRange::new(0.0, 9.0));
    }

    #[test]
    fn test_generator_names() {
        for name in ["Slic3r", "SuperSlicer", "PrusaSlicer"] {
            let header = HEADER.replace("PrusaSlicer", name);
            let found = Slic3rDialect::new().detect(&header).unwrap().unwrap();
            assert_eq!(found.source, name);
        }
    }

    #[test]
    fn test_other_generator_is_absent() {
        let header = HEADER.replace("PrusaSlicer", "OrcaSlicer");
        assert!(Slic3rDialect::new().detect(&header).unwrap().is_none());
    }

    #[test]
    fn test_missing_plater() {
        let header = "; generated by Slic3r 1.3.0 on 2019-01-01\nG21\n";
        assert!(Slic3rDialect::new().detect(header).is_err());
    }

    #[test]
    fn test_truncated_plater_json() {
        let header = "; generated by SuperSlicer 2.5\n; plater:{\"center\":[1,2,3],\"bounding";
        assert!(matches!(
            Slic3rDialect::new().detect(header),
            Err(GcodeError::MalformedMetadata { .. })
        ));
    }
}
