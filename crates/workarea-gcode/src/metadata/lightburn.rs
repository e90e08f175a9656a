use regex::Regex;
use std::sync::OnceLock;
use workarea_core::{AxisRange, BoundingBox};

use super::{parse_number, DialectMatch, MetadataDialect};
use crate::error::{GcodeError, GcodeResult};

const NAME: &str = "lightburn";

/// LightBurn bounds line
///
/// ```text
/// ; Bounds: X18.85 Y204.94 to X185.15 Y387.06
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LightBurnDialect;

impl LightBurnDialect {
    pub fn new() -> Self {
        Self
    }
}

fn bounds_line() -> &'static Regex {
    static BOUNDS_REGEX: OnceLock<Regex> = OnceLock::new();
    BOUNDS_REGEX.get_or_init(|| Regex::new(r";\s*Bounds:[ \t]*([^\r\n]*)").expect("invalid regex pattern"))
}

fn bounds_values() -> &'static Regex {
    static VALUES_REGEX: OnceLock<Regex> = OnceLock::new();
    VALUES_REGEX.get_or_init(|| {
        Regex::new(
            r"^X(-?\d+(?:\.\d*)?)\s*Y(-?\d+(?:\.\d*)?)\s*to\s*X(-?\d+(?:\.\d*)?)\s*Y(-?\d+(?:\.\d*)?)",
        )
        .expect("invalid regex pattern")
    })
}

impl MetadataDialect for LightBurnDialect {
    fn name(&self) -> &str {
        NAME
    }

    fn detect(&self, header: &str) -> GcodeResult<Option<DialectMatch>> {
        let Some(line) = bounds_line().captures(header) else {
            return Ok(None);
        };
        let text = line[1].trim();

        let values = bounds_values().captures(text).ok_or_else(|| {
            GcodeError::malformed(NAME, format!("unrecognised bounds line: {:?}", text))
        })?;

        let min_x = parse_number(NAME, "min X", &values[1])?;
        let min_y = parse_number(NAME, "min Y", &values[2])?;
        let max_x = parse_number(NAME, "max X", &values[3])?;
        let max_y = parse_number(NAME, "max Y", &values[4])?;

        Ok(Some(DialectMatch {
            source: "LightBurn".to_string(),
            bbox: BoundingBox::planar(AxisRange::new(min_x, max_x), AxisRange::new(min_y, max_y)),
        }))
    }
}
