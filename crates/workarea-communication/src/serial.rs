//! Serial port transport
//!
//! Commands are queued on an unbounded channel and written by a background
//! thread, one line at a time. After each line the thread waits for the
//! controller's `ok` (or `error`) before sending the next, so the controller's
//! receive buffer never overflows. `submit` itself never blocks.

use std::io::{self, Read, Write};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::error::{CommunicationError, CommunicationResult};
use crate::transport::MotionTransport;

/// Serial connection parameters
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Port name, e.g. `/dev/ttyUSB0` or `COM3`
    pub port: String,
    pub baud_rate: u32,
    /// How long to wait for an acknowledgement before sending the next line.
    /// Homing can take a while on large machines.
    pub ack_timeout: Duration,
}

impl SerialConfig {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            ack_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }
}

#[derive(Debug, PartialEq)]
enum Ack {
    Ok,
    Error(String),
    Timeout,
}

/// Background-writer transport over a serial line
pub struct SerialTransport {
    name: String,
    sender: Option<mpsc::UnboundedSender<String>>,
    worker: Option<JoinHandle<()>>,
}

impl SerialTransport {
    /// Open a serial port and start the writer thread
    pub fn open(config: &SerialConfig) -> CommunicationResult<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|e| {
                tracing::warn!("Failed to open serial port {}: {}", config.port, e);
                CommunicationError::PortOpen {
                    port: config.port.clone(),
                    reason: e.to_string(),
                }
            })?;

        tracing::info!("Opened {} at {} baud", config.port, config.baud_rate);
        Self::from_stream(config.port.clone(), port, config.ack_timeout)
    }

    /// Run the writer over any byte stream that behaves like a controller
    pub fn from_stream<P>(
        name: impl Into<String>,
        stream: P,
        ack_timeout: Duration,
    ) -> CommunicationResult<Self>
    where
        P: Read + Write + Send + 'static,
    {
        let name = name.into();
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker_name = name.clone();
        let worker = thread::Builder::new()
            .name(format!("serial-writer-{}", name))
            .spawn(move || run_writer(stream, receiver, ack_timeout, &worker_name))?;

        Ok(Self {
            name,
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop accepting commands and wait until the queue is drained
    pub fn close(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Serial writer for {} panicked", self.name);
            }
        }
    }
}

impl MotionTransport for SerialTransport {
    fn submit(&self, command: &str) {
        let queued = self
            .sender
            .as_ref()
            .map(|sender| sender.send(command.to_string()).is_ok())
            .unwrap_or(false);
        if !queued {
            tracing::warn!("{}: {}, dropping {:?}", self.name, CommunicationError::Closed, command);
        }
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_writer<P: Read + Write>(
    mut port: P,
    mut receiver: mpsc::UnboundedReceiver<String>,
    ack_timeout: Duration,
    name: &str,
) {
    let mut pending = Vec::new();

    while let Some(line) = receiver.blocking_recv() {
        tracing::debug!("{} >> {}", name, line);
        let written = port
            .write_all(line.as_bytes())
            .and_then(|_| port.write_all(b"\n"))
            .and_then(|_| port.flush());
        if let Err(e) = written {
            tracing::error!("Write to {} failed: {}", name, e);
            break;
        }

        match wait_for_ack(&mut port, ack_timeout, &mut pending) {
            Ok(Ack::Ok) => {}
            Ok(Ack::Error(reply)) => tracing::warn!("{} rejected {:?}: {}", name, line, reply),
            Ok(Ack::Timeout) => {
                tracing::warn!("No acknowledgement from {} for {:?}", name, line)
            }
            Err(e) => {
                tracing::error!("Read from {} failed: {}", name, e);
                break;
            }
        }
    }

    tracing::debug!("Serial writer for {} stopped", name);
}

fn wait_for_ack<P: Read>(port: &mut P, timeout: Duration, pending: &mut Vec<u8>) -> io::Result<Ack> {
    let deadline = Instant::now() + timeout;
    let mut buffer = [0u8; 256];

    loop {
        while let Some(end) = pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = pending.drain(..=end).collect();
            let reply = String::from_utf8_lossy(&raw).trim().to_string();
            if reply.starts_with("ok") {
                return Ok(Ack::Ok);
            }
            if reply.starts_with("error") || reply.starts_with("!!") {
                return Ok(Ack::Error(reply));
            }
            if !reply.is_empty() {
                tracing::debug!("<< {}", reply);
            }
        }

        if Instant::now() >= deadline {
            return Ok(Ack::Timeout);
        }

        match port.read(&mut buffer) {
            Ok(0) => thread::sleep(Duration::from_millis(1)),
            Ok(n) => pending.extend_from_slice(&buffer[..n]),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {}
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Answers every complete line with a fixed reply
    #[derive(Clone)]
    struct FakeController {
        written: Arc<Mutex<Vec<u8>>>,
        replies: Arc<Mutex<VecDeque<u8>>>,
        answer: Option<&'static str>,
    }

    impl FakeController {
        fn new(answer: Option<&'static str>) -> Self {
            Self {
                written: Arc::new(Mutex::new(Vec::new())),
                replies: Arc::new(Mutex::new(VecDeque::new())),
                answer,
            }
        }

        fn written(&self) -> String {
            String::from_utf8(self.written.lock().clone()).unwrap()
        }
    }

    impl Read for FakeController {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut replies = self.replies.lock();
            let n = buf.len().min(replies.len());
            for (slot, byte) in buf.iter_mut().zip(replies.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        }
    }

    impl Write for FakeController {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.lock().extend_from_slice(buf);
            if buf.contains(&b'\n') {
                if let Some(answer) = self.answer {
                    self.replies.lock().extend(answer.bytes());
                }
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lines_are_written_in_order() {
        let controller = FakeController::new(Some("ok\n"));
        let mut transport =
            SerialTransport::from_stream("fake", controller.clone(), Duration::from_secs(5))
                .unwrap();

        transport.submit("G28 XY");
        transport.submit("G90");
        transport.submit("G0 X1.0000 Y2.0000 F3000");
        transport.close();

        assert_eq!(
            controller.written(),
            "G28 XY\nG90\nG0 X1.0000 Y2.0000 F3000\n"
        );
    }

    #[test]
    fn test_rejected_and_unanswered_lines_do_not_stall() {
        let controller = FakeController::new(Some("error:20\n"));
        let mut transport =
            SerialTransport::from_stream("fake", controller.clone(), Duration::from_secs(5))
                .unwrap();
        transport.submit("G90");
        transport.submit("G0 Z10.0000 F300");
        transport.close();
        assert_eq!(controller.written(), "G90\nG0 Z10.0000 F300\n");

        let silent = FakeController::new(None);
        let mut transport =
            SerialTransport::from_stream("silent", silent.clone(), Duration::from_millis(20))
                .unwrap();
        transport.submit("G90");
        transport.submit("G90");
        transport.close();
        assert_eq!(silent.written(), "G90\nG90\n");
    }

    #[test]
    fn test_submit_after_close_is_dropped() {
        let controller = FakeController::new(Some("ok\n"));
        let mut transport =
            SerialTransport::from_stream("fake", controller.clone(), Duration::from_secs(5))
                .unwrap();
        transport.close();
        transport.submit("G90");
        assert_eq!(controller.written(), "");
    }

    #[test]
    fn test_wait_for_ack_skips_status_lines() {
        let mut stream: &[u8] = b"echo:busy\n<Idle|MPos:0,0,0>\nok\n";
        let mut pending = Vec::new();
        let ack = wait_for_ack(&mut stream, Duration::from_secs(1), &mut pending).unwrap();
        assert_eq!(ack, Ack::Ok);
    }
}
