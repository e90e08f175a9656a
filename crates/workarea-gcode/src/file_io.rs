//! Job file reading
//!
//! Two access patterns: a bounded header read for metadata comments, and a
//! buffered line stream for the full geometry scan.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::GcodeResult;

/// Bytes read from the start of a file when looking for metadata
pub const HEADER_SIZE: usize = 1024;

/// Buffer size for streaming large files (256 KB)
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// G-code file reader
#[derive(Debug, Clone)]
pub struct GcodeFileReader {
    path: PathBuf,
}

impl GcodeFileReader {
    /// Create a reader for an existing file
    ///
    /// # Errors
    /// Returns an I/O error if the path does not exist or is not a file
    pub fn new(path: impl AsRef<Path>) -> GcodeResult<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Path is not a file: {}", path.display()),
            )
            .into());
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the first [`HEADER_SIZE`] bytes as text
    ///
    /// Invalid UTF-8, including a character split at the cut-off, is replaced
    /// rather than rejected.
    pub fn read_header(&self) -> GcodeResult<String> {
        self.read_prefix(HEADER_SIZE)
    }

    /// Read at most `max_bytes` from the start of the file as text
    pub fn read_prefix(&self, max_bytes: usize) -> GcodeResult<String> {
        let file = File::open(&self.path)?;
        let mut buffer = Vec::with_capacity(max_bytes);
        file.take(max_bytes as u64).read_to_end(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Stream every line through `callback`, returning the line count
    pub fn read_lines<F>(&self, mut callback: F) -> GcodeResult<u64>
    where
        F: FnMut(&str),
    {
        let file = File::open(&self.path)?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        let mut buffer = Vec::new();
        let mut lines_read = 0u64;

        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buffer);
            callback(line.trim_end_matches(['\r', '\n']));
            lines_read += 1;
        }

        Ok(lines_read)
    }
}
