//! Full-file extents analysis
//!
//! The last-resort source of a work area: every move in the program is
//! replayed and the positions it reaches are accumulated per axis.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::path::Path;

use workarea_core::{Axis, AxisRange, BoundingBox, Position};

use crate::error::{GcodeError, GcodeResult};
use crate::file_io::GcodeFileReader;
use crate::parser::{parse_words, strip_comments, DistanceMode, GcodeState, UnitsMode, Word};

/// Computes the extents of a job by scanning its motion path
pub trait GeometryAnalyzer: Send + Sync {
    fn analyze(&self, path: &Path) -> GcodeResult<BoundingBox>;
}

/// Per-axis running extents; `None` until an axis is first moved
#[derive(Debug, Default)]
struct Extents {
    ranges: [Option<AxisRange>; 3],
}

impl Extents {
    fn include(&mut self, axis: Axis, value: f64) {
        let slot = &mut self.ranges[axis as usize];
        match slot {
            Some(range) => range.include(value),
            None => *slot = Some(AxisRange::point(value)),
        }
    }

    fn touched(&self, axis: Axis) -> bool {
        self.ranges[axis as usize].is_some()
    }

    fn is_empty(&self) -> bool {
        self.ranges.iter().all(Option::is_none)
    }

    fn into_bounding_box(self) -> BoundingBox {
        let [x, y, z] = self.ranges.map(Option::unwrap_or_default);
        BoundingBox::new(x, y, z)
    }
}

/// Replays a program and tracks where the tool goes
#[derive(Debug, Default)]
pub struct ExtentsTracker {
    state: GcodeState,
    extents: Extents,
}

impl ExtentsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GcodeState {
        &self.state
    }

    /// Feed one raw line of G-code
    pub fn process_line(&mut self, line: &str) {
        let cleaned = strip_comments(line);
        if cleaned.is_empty() {
            return;
        }
        let words = parse_words(&cleaned);
        if words.is_empty() {
            return;
        }

        let axis_word = |letter: char| words.iter().find(|w| w.letter == letter).map(|w| w.value);
        let (x, y, z) = (axis_word('X'), axis_word('Y'), axis_word('Z'));

        let mut non_motion = None;
        for word in words.iter().filter(|w| w.letter == 'G') {
            match gcode_number(word) {
                Some(code @ 0..=3) => self.state.motion_mode = code,
                Some(20) => self.state.units_mode = UnitsMode::Inches,
                Some(21) => self.state.units_mode = UnitsMode::Millimeters,
                Some(90) => self.state.distance_mode = DistanceMode::Absolute,
                Some(91) => self.state.distance_mode = DistanceMode::Incremental,
                Some(code @ (4 | 10 | 28 | 30 | 53 | 92)) => non_motion = Some(code),
                _ => {}
            }
        }

        match non_motion {
            Some(92) => self.state.set_origin(x, y, z),
            Some(28 | 30) => self.home(x, y, z),
            Some(_) => {}
            None if x.is_some() || y.is_some() || z.is_some() => {
                let target = self.state.target(x, y, z);
                if matches!(self.state.motion_mode, 2 | 3) {
                    self.include_arc(&target, axis_word('I'), axis_word('J'));
                }
                self.state.position = target;
                self.include_position(x.is_some(), y.is_some(), z.is_some());
            }
            None => {}
        }
    }

    /// Extents seen so far, or `None` if nothing has moved
    pub fn finish(self) -> Option<BoundingBox> {
        if self.extents.is_empty() {
            None
        } else {
            Some(self.extents.into_bounding_box())
        }
    }

    fn home(&mut self, x: Option<f64>, y: Option<f64>, z: Option<f64>) {
        let all = x.is_none() && y.is_none() && z.is_none();
        if all || x.is_some() {
            self.state.position.x = 0.0;
        }
        if all || y.is_some() {
            self.state.position.y = 0.0;
        }
        if all || z.is_some() {
            self.state.position.z = 0.0;
        }
    }

    fn include_position(&mut self, x_named: bool, y_named: bool, z_named: bool) {
        let position = self.state.position;
        for (axis, named, value) in [
            (Axis::X, x_named, position.x),
            (Axis::Y, y_named, position.y),
            (Axis::Z, z_named, position.z),
        ] {
            if named || self.extents.touched(axis) {
                self.extents.include(axis, value);
            }
        }
    }

    /// Add the axis-crossing points of an XY arc given in centre format
    fn include_arc(&mut self, target: &Position, i: Option<f64>, j: Option<f64>) {
        if i.is_none() && j.is_none() {
            return;
        }
        let start = self.state.position;
        let cx = start.x + self.state.to_mm(i.unwrap_or(0.0));
        let cy = start.y + self.state.to_mm(j.unwrap_or(0.0));
        let radius = (start.x - cx).hypot(start.y - cy);
        if radius == 0.0 {
            return;
        }

        let start_angle = (start.y - cy).atan2(start.x - cx);
        let end_angle = (target.y - cy).atan2(target.x - cx);
        let clockwise = self.state.motion_mode == 2;

        let mut sweep = if clockwise {
            (start_angle - end_angle).rem_euclid(TAU)
        } else {
            (end_angle - start_angle).rem_euclid(TAU)
        };
        if sweep == 0.0 {
            sweep = TAU;
        }

        for angle in [0.0, FRAC_PI_2, PI, -FRAC_PI_2] {
            let offset = if clockwise {
                (start_angle - angle).rem_euclid(TAU)
            } else {
                (angle - start_angle).rem_euclid(TAU)
            };
            if offset <= sweep {
                self.extents.include(Axis::X, cx + radius * angle.cos());
                self.extents.include(Axis::Y, cy + radius * angle.sin());
            }
        }
    }
}

fn gcode_number(word: &Word) -> Option<u8> {
    if word.value.fract() != 0.0 || !(0.0..=255.0).contains(&word.value) {
        return None;
    }
    Some(word.value as u8)
}

/// Streams a G-code file through an [`ExtentsTracker`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GcodeExtentsAnalyzer;

impl GcodeExtentsAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryAnalyzer for GcodeExtentsAnalyzer {
    fn analyze(&self, path: &Path) -> GcodeResult<BoundingBox> {
        let reader = GcodeFileReader::new(path)?;
        let mut tracker = ExtentsTracker::new();
        let lines = reader.read_lines(|line| tracker.process_line(line))?;
        tracing::debug!("Scanned {} lines of {}", lines, path.display());

        tracker
            .finish()
            .ok_or_else(|| GcodeError::NoMotion(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(program: &str) -> Option<BoundingBox> {
        let mut tracker = ExtentsTracker::new();
        for line in program.lines() {
            tracker.process_line(line);
        }
        tracker.finish()
    }

    fn assert_range(range: AxisRange, min: f64, max: f64) {
        assert!(
            (range.min - min).abs() < 1e-6 && (range.max - max).abs() < 1e-6,
            "expected ({}, {}), got ({}, {})",
            min,
            max,
            range.min,
            range.max
        );
    }

    #[test]
    fn test_absolute_moves() {
        let bbox = scan("G21\nG90\nG0 X10 Y20\nG1 X50 Y5 Z-1\nG1 X30\n").unwrap();
        assert_range(bbox.x, 10.0, 50.0);
        assert_range(bbox.y, 5.0, 20.0);
        // Z only counts from the first move that names it
        assert_range(bbox.z, -1.0, -1.0);
    }

    #[test]
    fn test_untouched_axis_is_zero() {
        let bbox = scan("G1 X5 Y5\nG1 X15 Y25\n").unwrap();
        assert_range(bbox.z, 0.0, 0.0);
    }

    #[test]
    fn test_modal_motion_and_comments() {
        let bbox = scan("G1 X1 Y1 ; start\n(skip X900)\nX4 Y9\n").unwrap();
        assert_range(bbox.x, 1.0, 4.0);
        assert_range(bbox.y, 1.0, 9.0);
    }

    #[test]
    fn test_incremental_and_inches() {
        let bbox = scan("G20\nG91\nG0 X1 Y1\nG0 X1\n").unwrap();
        assert_range(bbox.x, 25.4, 50.8);
        assert_range(bbox.y, 25.4, 25.4);
    }

    #[test]
    fn test_g92_shifts_program_coordinates() {
        let bbox = scan("G0 X100 Y100\nG92 X0 Y0\nG0 X10 Y-10\n").unwrap();
        assert_range(bbox.x, 100.0, 110.0);
        assert_range(bbox.y, 90.0, 100.0);
    }

    #[test]
    fn test_g28_is_not_a_move() {
        let bbox = scan("G0 X10 Y10\nG28 X0\nG91\nG0 X5\n").unwrap();
        assert_range(bbox.x, 5.0, 10.0);
    }

    #[test]
    fn test_ccw_half_circle_reaches_top() {
        // From (0,0) to (20,0) counter-clockwise around (10,0) passes through y = -10
        let bbox = scan("G0 X0 Y0\nG3 X20 Y0 I10 J0\n").unwrap();
        assert_range(bbox.x, 0.0, 20.0);
        assert_range(bbox.y, -10.0, 0.0);
    }

    #[test]
    fn test_cw_half_circle_reaches_bottom() {
        let bbox = scan("G0 X0 Y0\nG2 X20 Y0 I10 J0\n").unwrap();
        assert_range(bbox.y, 0.0, 10.0);
    }

    #[test]
    fn test_full_circle() {
        let bbox = scan("G0 X0 Y0\nG2 X0 Y0 I5 J0\n").unwrap();
        assert_range(bbox.x, 0.0, 10.0);
        assert_range(bbox.y, -5.0, 5.0);
    }

    #[test]
    fn test_no_motion() {
        assert!(scan("; nothing here\nM104 S200\nG28\n").is_none());
    }

    proptest::proptest! {
        #[test]
        fn prop_box_covers_every_linear_move(
            points in proptest::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 1..40)
        ) {
            let program: String = points
                .iter()
                .map(|(x, y)| format!("G1 X{:.3} Y{:.3}\n", x, y))
                .collect();
            let bbox = scan(&program).unwrap();

            for (x, y) in &points {
                let round = |v: &f64| format!("{:.3}", v).parse::<f64>().unwrap();
                let (x, y) = (round(x), round(y));
                proptest::prop_assert!(bbox.x.min <= x && x <= bbox.x.max);
                proptest::prop_assert!(bbox.y.min <= y && y <= bbox.y.max);
            }
            proptest::prop_assert!(bbox.is_valid());
        }
    }
}
