//! Motion transports
//!
//! A [`MotionTransport`] accepts formatted command lines and hands them to a
//! controller without waiting for the motion to finish.

use parking_lot::Mutex;
use std::io::{self, Write};
use workarea_core::Position;

pub trait MotionTransport: Send + Sync {
    /// Queue a single command line. Fire-and-forget.
    fn submit(&self, command: &str);

    /// Last known machine position, if the transport tracks one
    fn current_position(&self) -> Option<Position> {
        None
    }
}

/// Keeps every submitted line in memory
#[derive(Debug, Default)]
pub struct RecordingTransport {
    commands: Mutex<Vec<String>>,
    position: Option<Position>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder that reports `position` as the current machine position
    pub fn with_position(position: Position) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            position: Some(position),
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.commands.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.lock().is_empty()
    }

    pub fn clear(&self) {
        self.commands.lock().clear();
    }
}

impl MotionTransport for RecordingTransport {
    fn submit(&self, command: &str) {
        self.commands.lock().push(command.to_string());
    }

    fn current_position(&self) -> Option<Position> {
        self.position
    }
}

/// Writes each command as a line to any [`Write`] sink
///
/// Useful for dry runs to stdout or for saving an outline program to a file.
/// Write failures are logged and otherwise ignored.
pub struct WriterTransport<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterTransport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl WriterTransport<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> MotionTransport for WriterTransport<W> {
    fn submit(&self, command: &str) {
        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{}", command).and_then(|_| writer.flush()) {
            tracing::warn!("Failed to write command {:?}: {}", command, e);
        }
    }
}
