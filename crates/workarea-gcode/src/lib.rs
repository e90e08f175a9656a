//! # WorkArea G-code
//!
//! Reads what a job file says about its own extents. Slicer and CAM tools
//! leave bounds in header comments in a handful of dialects; when none is
//! present the whole motion path is scanned instead.

pub mod error;
pub mod extents;
pub mod file_io;
pub mod metadata;
pub mod parser;

pub use error::{GcodeError, GcodeResult};
pub use extents::{ExtentsTracker, GcodeExtentsAnalyzer, GeometryAnalyzer};
pub use file_io::{GcodeFileReader, HEADER_SIZE};
pub use metadata::{
    DialectHandle, DialectMatch, DialectPipeline, Fusion360Dialect, LightBurnDialect,
    MetadataDialect, Slic3rDialect,
};
pub use parser::{parse_words, strip_comments, DistanceMode, GcodeState, UnitsMode, Word};
