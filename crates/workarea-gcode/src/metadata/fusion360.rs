use regex::Regex;
use std::sync::OnceLock;
use workarea_core::{Axis, AxisRange, BoundingBox};

use super::{parse_number, DialectMatch, MetadataDialect};
use crate::error::{GcodeError, GcodeResult};

const NAME: &str = "fusion360";

/// Fusion 360 ranges table
///
/// ```text
/// ; Ranges table:
/// ; X: Min=-0.5 Max=63.4 Size=63.9
/// ; Y: Min=-0.5 Max=25.4 Size=25.9
/// ```
///
/// The table header is optional; X and Y rows are both required once either
/// is present. A Z row, when written, is not used.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fusion360Dialect;

impl Fusion360Dialect {
    pub fn new() -> Self {
        Self
    }
}

fn table_header() -> &'static Regex {
    static HEADER_REGEX: OnceLock<Regex> = OnceLock::new();
    HEADER_REGEX.get_or_init(|| Regex::new(r";\s*Ranges table:").expect("invalid regex pattern"))
}

fn range_row() -> &'static Regex {
    static ROW_REGEX: OnceLock<Regex> = OnceLock::new();
    ROW_REGEX.get_or_init(|| {
        Regex::new(r"(?m)^;\s*([XYZ]):\s*Min=(\S+)\s+Max=(\S+)\s+Size=(\S+)")
            .expect("invalid regex pattern")
    })
}

fn read_row(header: &str, axis: Axis) -> GcodeResult<Option<AxisRange>> {
    let letter = axis.letter().to_string();
    let Some(row) = range_row()
        .captures_iter(header)
        .find(|caps| caps[1] == letter)
    else {
        return Ok(None);
    };

    let min = parse_number(NAME, &format!("{} Min", letter), &row[2])?;
    let max = parse_number(NAME, &format!("{} Max", letter), &row[3])?;
    Ok(Some(AxisRange::new(min, max)))
}

impl MetadataDialect for Fusion360Dialect {
    fn name(&self) -> &str {
        NAME
    }

    fn detect(&self, header: &str) -> GcodeResult<Option<DialectMatch>> {
        let x = read_row(header, Axis::X)?;
        let y = read_row(header, Axis::Y)?;

        match (x, y) {
            (Some(x), Some(y)) => Ok(Some(DialectMatch {
                source: "Fusion360".to_string(),
                bbox: BoundingBox::planar(x, y),
            })),
            (None, None) if !table_header().is_match(header) => Ok(None),
            _ => Err(GcodeError::malformed(
                NAME,
                "ranges table needs both an X and a Y row",
            )),
        }
    }
}
