//! # WorkArea Communication
//!
//! Everything between a planned outline and the controller: the motion
//! commands themselves and the transports that carry them.
//!
//! Transports are fire-and-forget. `submit` queues or writes a line and
//! returns; physical motion completes later on the controller.

pub mod command;
pub mod error;
pub mod serial;
pub mod transport;

pub use command::{HomeAxes, MotionCommand};
pub use error::{CommunicationError, CommunicationResult};
pub use serial::{SerialConfig, SerialTransport};
pub use transport::{MotionTransport, RecordingTransport, WriterTransport};
