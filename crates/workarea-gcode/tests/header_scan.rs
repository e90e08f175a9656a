use std::io::Write;

use tempfile::NamedTempFile;
use workarea_core::AxisRange;
use workarea_gcode::{
    DialectPipeline, GcodeError, GcodeExtentsAnalyzer, GeometryAnalyzer, HEADER_SIZE,
};

fn job_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_scan_file_finds_lightburn_bounds() {
    let file = job_file("; LightBurn 1.4\n; Bounds: X18.85 Y204.94 to X185.15 Y387.06\nG0 X18.85 Y204.94\n");
    let found = DialectPipeline::with_defaults()
        .scan_file(file.path())
        .unwrap()
        .unwrap();
    assert_eq!(found.source, "LightBurn");
    assert_eq!(found.bbox.y, AxisRange::new(204.94, 387.06));
}

#[test]
fn test_metadata_past_header_is_ignored() {
    let mut content = String::new();
    while content.len() <= HEADER_SIZE {
        content.push_str("G1 X1 Y1\n");
    }
    content.push_str("; Bounds: X0 Y0 to X10 Y10\n");

    let file = job_file(&content);
    assert!(DialectPipeline::with_defaults()
        .scan_file(file.path())
        .unwrap()
        .is_none());
}

#[test]
fn test_malformed_dialect_falls_through_to_next() {
    // Broken LightBurn line followed by a usable Fusion 360 table
    let file = job_file(
        "; Bounds: ???\n; Ranges table:\n; X: Min=-0.5 Max=63.4 Size=63.9\n; Y: Min=-0.5 Max=25.4 Size=25.9\n",
    );
    let found = DialectPipeline::with_defaults()
        .scan_file(file.path())
        .unwrap()
        .unwrap();
    assert_eq!(found.source, "Fusion360");
    assert_eq!(found.bbox.x, AxisRange::new(-0.5, 63.4));
}

#[test]
fn test_geometry_scan_of_file() {
    let file = job_file("G21\nG90\nG0 Z5\nG0 X12 Y8\nG1 Z-0.5 F300\nG1 X40 Y8 F1200\nG1 X40 Y30\nG0 Z5\n");
    let bbox = GcodeExtentsAnalyzer::new().analyze(file.path()).unwrap();
    assert_eq!(bbox.x, AxisRange::new(12.0, 40.0));
    assert_eq!(bbox.y, AxisRange::new(8.0, 30.0));
    assert_eq!(bbox.z, AxisRange::new(-0.5, 5.0));
}

#[test]
fn test_geometry_scan_without_motion() {
    let file = job_file("; only comments\nM3 S1000\nM5\n");
    assert!(matches!(
        GcodeExtentsAnalyzer::new().analyze(file.path()),
        Err(GcodeError::NoMotion(_))
    ));
}

#[test]
fn test_geometry_scan_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        GcodeExtentsAnalyzer::new().analyze(&dir.path().join("gone.gcode")),
        Err(GcodeError::Io(_))
    ));
}
