//! Minimal G-code line parsing
//!
//! Only what the extents scan needs: comment removal, word splitting and the
//! modal state that changes how coordinates are interpreted.

use regex::Regex;
use std::sync::OnceLock;
use workarea_core::Position;

const MM_PER_INCH: f64 = 25.4;

/// Remove `;` line comments and `( )` inline comments
pub fn strip_comments(line: &str) -> String {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COMMENT_REGEX
        .get_or_init(|| Regex::new(r"\([^)]*\)?|;.*").expect("invalid regex pattern"));
    regex.replace_all(line, " ").trim().to_string()
}

/// A single letter/value word such as `X12.5`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Word {
    pub letter: char,
    pub value: f64,
}

/// Split a comment-free line into words
///
/// Words may be separated by whitespace or written back to back (`G1X10Y5`).
/// Line numbers and checksums are dropped.
pub fn parse_words(line: &str) -> Vec<Word> {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = WORD_REGEX.get_or_init(|| {
        Regex::new(r"([A-Za-z])\s*([+-]?(?:\d+\.?\d*|\.\d+))").expect("invalid regex pattern")
    });

    regex
        .captures_iter(line)
        .filter_map(|caps| {
            let letter = caps.get(1)?.as_str().chars().next()?.to_ascii_uppercase();
            let value = caps.get(2)?.as_str().parse::<f64>().ok()?;
            Some(Word { letter, value })
        })
        .filter(|word| word.letter != 'N')
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMode {
    /// G90
    #[default]
    Absolute,
    /// G91
    Incremental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitsMode {
    /// G21
    #[default]
    Millimeters,
    /// G20
    Inches,
}

impl UnitsMode {
    fn to_mm(self, value: f64) -> f64 {
        match self {
            Self::Millimeters => value,
            Self::Inches => value * MM_PER_INCH,
        }
    }
}

/// Motion-relevant modal state of a program
///
/// `position` is in machine millimetres. `offset` is what G92 subtracted:
/// program coordinate = machine coordinate - offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GcodeState {
    pub distance_mode: DistanceMode,
    pub units_mode: UnitsMode,
    pub motion_mode: u8,
    pub position: Position,
    pub offset: Position,
}

impl Default for GcodeState {
    fn default() -> Self {
        Self {
            distance_mode: DistanceMode::Absolute,
            units_mode: UnitsMode::Millimeters,
            motion_mode: 0,
            position: Position::origin(),
            offset: Position::origin(),
        }
    }
}

impl GcodeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a word value to millimetres under the current units
    pub fn to_mm(&self, value: f64) -> f64 {
        self.units_mode.to_mm(value)
    }

    /// Machine position a move with the given axis words ends at
    ///
    /// Missing axes keep their current value.
    pub fn target(&self, x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Position {
        let resolve = |word: Option<f64>, current: f64, offset: f64| match word {
            None => current,
            Some(value) => {
                let value = self.to_mm(value);
                match self.distance_mode {
                    DistanceMode::Absolute => value + offset,
                    DistanceMode::Incremental => current + value,
                }
            }
        };

        Position::new(
            resolve(x, self.position.x, self.offset.x),
            resolve(y, self.position.y, self.offset.y),
            resolve(z, self.position.z, self.offset.z),
        )
    }

    /// G92: make the current machine position read as the given coordinates
    ///
    /// With no axis words every offset is cleared.
    pub fn set_origin(&mut self, x: Option<f64>, y: Option<f64>, z: Option<f64>) {
        if x.is_none() && y.is_none() && z.is_none() {
            self.offset = Position::origin();
            return;
        }
        if let Some(x) = x {
            self.offset.x = self.position.x - self.to_mm(x);
        }
        if let Some(y) = y {
            self.offset.y = self.position.y - self.to_mm(y);
        }
        if let Some(z) = z {
            self.offset.z = self.position.z - self.to_mm(z);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("G1 X10 ; move right"), "G1 X10");
        assert_eq!(strip_comments("G1 (rapid) X10 Y5"), "G1   X10 Y5");
        assert_eq!(strip_comments("; Bounds: X1 Y2 to X3 Y4"), "");
        assert_eq!(strip_comments("(unterminated X99"), "");
    }

    #[test]
    fn test_parse_words() {
        let words = parse_words("N10 G1X10.5 y-2 Z.5 F1200*45");
        let letters: Vec<char> = words.iter().map(|w| w.letter).collect();
        assert_eq!(letters, vec!['G', 'X', 'Y', 'Z', 'F']);
        assert_eq!(words[1].value, 10.5);
        assert_eq!(words[2].value, -2.0);
        assert_eq!(words[3].value, 0.5);
    }

    #[test]
    fn test_incremental_target() {
        let mut state = GcodeState::new();
        state.position = Position::new(10.0, 10.0, 1.0);
        state.distance_mode = DistanceMode::Incremental;
        let target = state.target(Some(5.0), None, Some(-1.0));
        assert_eq!(target, Position::new(15.0, 10.0, 0.0));
    }

    #[test]
    fn test_inch_target() {
        let mut state = GcodeState::new();
        state.units_mode = UnitsMode::Inches;
        let target = state.target(Some(1.0), Some(2.0), None);
        assert!((target.x - 25.4).abs() < 1e-9);
        assert!((target.y - 50.8).abs() < 1e-9);
    }

    #[test]
    fn test_g92_offset() {
        let mut state = GcodeState::new();
        state.position = Position::new(50.0, 20.0, 0.0);
        state.set_origin(Some(0.0), Some(0.0), None);

        // X0 in program coordinates is now machine X50
        let target = state.target(Some(10.0), Some(0.0), None);
        assert_eq!(target, Position::new(60.0, 20.0, 0.0));

        state.set_origin(None, None, None);
        assert_eq!(state.offset, Position::origin());
    }
}
