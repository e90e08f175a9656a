//! Host file management
//!
//! The outliner never enumerates files itself. A host exposes the selected
//! job, where it lives on disk, and whatever analysis it stored for it, through
//! the [`JobLocator`] and [`AnalysisStore`] capabilities.
//!
//! Local-disk implementations are provided for standalone use. Stored analysis
//! follows the on-disk layout used by OctoPrint: a `.metadata.json` file in each
//! folder mapping file names to their metadata records.

use crate::error::{Error, MetadataError, Result};
use crate::geometry::{AxisRange, BoundingBox};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Name of the per-folder metadata file
pub const METADATA_FILE_NAME: &str = ".metadata.json";

/// Where a job file is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageLocation {
    /// Host filesystem
    #[default]
    Local,
    /// Controller SD card, not reachable from the host filesystem
    Sdcard,
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Sdcard => write!(f, "sdcard"),
        }
    }
}

/// Identifies the active job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    pub location: StorageLocation,
    /// Path relative to the storage root, e.g. `parts/bracket.gcode`
    pub filename: String,
}

impl JobRef {
    pub fn local(filename: impl Into<String>) -> Self {
        Self {
            location: StorageLocation::Local,
            filename: filename.into(),
        }
    }
}

/// Printing area computed by a previous host analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintingArea {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl PrintingArea {
    pub fn to_bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            AxisRange::new(self.min_x, self.max_x),
            AxisRange::new(self.min_y, self.max_y),
            AxisRange::new(self.min_z, self.max_z),
        )
    }
}

/// Analysis section of a metadata record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    #[serde(default)]
    pub printing_area: Option<PrintingArea>,
}

/// Metadata a host stores per job file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(default)]
    pub analysis: Option<Analysis>,
}

impl FileMetadata {
    /// Shortcut to `analysis.printingArea`
    pub fn printing_area(&self) -> Option<&PrintingArea> {
        self.analysis.as_ref()?.printing_area.as_ref()
    }
}

/// Exposes the active job and maps jobs to files on disk
pub trait JobLocator: Send + Sync {
    /// Job currently selected for printing, if any
    fn current_job(&self) -> Option<JobRef>;

    /// Whether the selected job is running
    fn is_printing(&self) -> bool {
        false
    }

    /// Absolute path of a job file
    fn path_on_disk(&self, location: StorageLocation, filename: &str) -> Result<PathBuf>;
}

/// Serves analysis previously stored for a job
pub trait AnalysisStore: Send + Sync {
    fn get_metadata(&self, location: StorageLocation, filename: &str) -> Option<FileMetadata>;
}

/// Job locator over a directory of local files
#[derive(Debug)]
pub struct LocalJobLocator {
    base_dir: PathBuf,
    selected: RwLock<Option<String>>,
    printing: AtomicBool,
}

impl LocalJobLocator {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            selected: RwLock::new(None),
            printing: AtomicBool::new(false),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Select a job by its path relative to the base directory
    pub fn select(&self, filename: impl Into<String>) {
        *self.selected.write() = Some(filename.into());
    }

    pub fn clear_selection(&self) {
        *self.selected.write() = None;
        self.printing.store(false, Ordering::SeqCst);
    }

    pub fn set_printing(&self, printing: bool) {
        self.printing.store(printing, Ordering::SeqCst);
    }
}

impl JobLocator for LocalJobLocator {
    fn current_job(&self) -> Option<JobRef> {
        self.selected.read().as_ref().map(JobRef::local)
    }

    fn is_printing(&self) -> bool {
        self.printing.load(Ordering::SeqCst)
    }

    fn path_on_disk(&self, location: StorageLocation, filename: &str) -> Result<PathBuf> {
        match location {
            StorageLocation::Local => Ok(self.base_dir.join(filename)),
            StorageLocation::Sdcard => Err(Error::InvalidJob(format!(
                "{} is stored on the SD card and has no local path",
                filename
            ))),
        }
    }
}

/// Reads `.metadata.json` files below a base directory
#[derive(Debug, Clone)]
pub struct MetadataFileStore {
    base_dir: PathBuf,
}

impl MetadataFileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Load the metadata map of the folder containing `filename`
    ///
    /// Records that do not decode are skipped; only an unreadable or
    /// non-object `.metadata.json` fails the whole folder.
    pub fn load_folder(&self, filename: &str) -> Result<HashMap<String, FileMetadata>> {
        Ok(self
            .raw_records(filename)?
            .into_iter()
            .filter_map(|(name, value)| match decode_record(&name, value) {
                Ok(metadata) => Some((name, metadata)),
                Err(e) => {
                    tracing::debug!("Skipping record: {}", e);
                    None
                }
            })
            .collect())
    }

    fn raw_records(&self, filename: &str) -> Result<HashMap<String, serde_json::Value>> {
        let folder = match Path::new(filename).parent() {
            Some(parent) => self.base_dir.join(parent),
            None => self.base_dir.clone(),
        };

        let content = std::fs::read_to_string(folder.join(METADATA_FILE_NAME))?;
        Ok(serde_json::from_str(&content).map_err(MetadataError::from)?)
    }

    /// Decodes only the record of `filename`, leaving its siblings untouched
    fn lookup(&self, filename: &str) -> Result<Option<FileMetadata>> {
        let key = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidJob(format!("not a file name: {}", filename)))?;

        match self.raw_records(filename)?.remove(key) {
            Some(value) => Ok(Some(decode_record(key, value)?)),
            None => Ok(None),
        }
    }
}

fn decode_record(name: &str, value: serde_json::Value) -> Result<FileMetadata> {
    serde_json::from_value(value).map_err(|e| {
        MetadataError::Malformed {
            filename: name.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

impl AnalysisStore for MetadataFileStore {
    fn get_metadata(&self, location: StorageLocation, filename: &str) -> Option<FileMetadata> {
        if location != StorageLocation::Local {
            return None;
        }

        match self.lookup(filename) {
            Ok(found) => found,
            Err(e) if e.is_io_error() => {
                tracing::debug!("No stored metadata for {}: {}", filename, e);
                None
            }
            Err(e) => {
                tracing::warn!("Unusable stored metadata for {}: {}", filename, e);
                None
            }
        }
    }
}
