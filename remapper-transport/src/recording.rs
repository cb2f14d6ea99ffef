//! In-memory transport that records every report instead of writing it
//!
//! Used for dry runs and for exercising controllers without hardware.

use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use crate::command::{parse_frame, ParsedCommand};
use crate::error::{ProtocolError, TransportError};
use crate::frame::CommandFrame;
use crate::protocol::ProtocolRevision;
use crate::types::{DeviceDescriptor, ReportMode};
use crate::Transport;

/// One report captured by [`RecordingTransport`]
#[derive(Debug, Clone)]
pub struct SentReport {
    pub report_id: u8,
    /// Frame bytes without the report id
    pub frame: Vec<u8>,
    pub at: Instant,
}

impl SentReport {
    /// Bytes as they would have been handed to hidapi
    pub fn wire_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.frame.len() + 1);
        buf.push(self.report_id);
        buf.extend_from_slice(&self.frame);
        buf
    }

    /// Interpret the frame the way the firmware would
    pub fn parse(&self, revision: ProtocolRevision) -> Result<ParsedCommand, ProtocolError> {
        parse_frame(&self.frame, revision)
    }
}

pub struct RecordingTransport {
    info: DeviceDescriptor,
    report_mode: ReportMode,
    sent: Mutex<Vec<SentReport>>,
    fail_after: Option<usize>,
}

impl RecordingTransport {
    pub fn new(info: DeviceDescriptor, report_mode: ReportMode) -> Self {
        Self {
            info,
            report_mode,
            sent: Mutex::new(Vec::new()),
            fail_after: None,
        }
    }

    /// Accept `n` frames, then fail every further send with a write error
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn report_mode(&self) -> ReportMode {
        self.report_mode
    }

    /// Everything sent so far, oldest first
    pub fn reports(&self) -> Vec<SentReport> {
        self.sent.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl Transport for RecordingTransport {
    fn send_frame(&self, frame: &CommandFrame) -> Result<(), TransportError> {
        let mut sent = self.sent.lock();
        if let Some(limit) = self.fail_after {
            if sent.len() >= limit {
                return Err(TransportError::Write(format!(
                    "simulated failure after {limit} reports"
                )));
            }
        }
        debug!(
            "Recorded cmd 0x{:02X} ({} bytes)",
            frame.command_id(),
            frame.len()
        );
        sent.push(SentReport {
            report_id: self.report_mode.report_id(),
            frame: frame.as_bytes().to_vec(),
            at: Instant::now(),
        });
        Ok(())
    }

    fn device_info(&self) -> &DeviceDescriptor {
        &self.info
    }
}
