//! HID session over an open `hidapi` handle

use hidapi::{HidApi, HidDevice};
use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::error::TransportError;
use crate::frame::CommandFrame;
use crate::types::{DeviceDescriptor, ReportMode};
use crate::Transport;

/// Prefix `frame` with the report id byte hidapi expects
pub fn frame_report(report_id: u8, frame: &CommandFrame) -> Vec<u8> {
    let mut buf = Vec::with_capacity(frame.len() + 1);
    buf.push(report_id);
    buf.extend_from_slice(frame.as_bytes());
    buf
}

/// Exclusive session on the configuration interface.
///
/// The handle closes when the session is dropped.
pub struct HidSession {
    device: Mutex<HidDevice>,
    info: DeviceDescriptor,
    report_mode: ReportMode,
}

impl HidSession {
    /// Open `descriptor` by path.
    ///
    /// Fails with `PermissionDenied` (missing udev rule, not admin) or `Open`
    /// (device gone, interface claimed exclusively).
    pub fn open(
        api: &HidApi,
        descriptor: DeviceDescriptor,
        report_mode: ReportMode,
    ) -> Result<Self, TransportError> {
        let device = api
            .open_path(&descriptor.path)
            .map_err(|e| TransportError::open_failed(descriptor.path_lossy(), &e))?;
        info!(
            "Opened configuration interface {:04X}:{:04X} at {} ({})",
            descriptor.vendor_id,
            descriptor.product_id,
            descriptor.path_lossy(),
            report_mode
        );
        Ok(Self::new(device, descriptor, report_mode))
    }

    /// Wrap an already opened device
    pub fn new(device: HidDevice, info: DeviceDescriptor, report_mode: ReportMode) -> Self {
        Self {
            device: Mutex::new(device),
            info,
            report_mode,
        }
    }

    pub fn report_mode(&self) -> ReportMode {
        self.report_mode
    }
}

impl Transport for HidSession {
    fn send_frame(&self, frame: &CommandFrame) -> Result<(), TransportError> {
        let buf = frame_report(self.report_mode.report_id(), frame);
        debug!(
            "Sending cmd 0x{:02X} as {}: {:02X?}",
            frame.command_id(),
            self.report_mode,
            &buf[..buf.len().min(12)]
        );

        let device = self.device.lock();
        match self.report_mode {
            ReportMode::Feature { .. } => device
                .send_feature_report(&buf)
                .map_err(|e| TransportError::Write(e.to_string())),
            ReportMode::Output { .. } => {
                let written = device
                    .write(&buf)
                    .map_err(|e| TransportError::Write(e.to_string()))?;
                trace!("Wrote {} bytes", written);
                Ok(())
            }
        }
    }

    fn read_report(&self, len: usize, timeout_ms: i32) -> Result<Vec<u8>, TransportError> {
        let device = self.device.lock();
        match self.report_mode {
            ReportMode::Feature { report_id } => {
                let mut buf = vec![0u8; len + 1];
                buf[0] = report_id;
                let n = device
                    .get_feature_report(&mut buf)
                    .map_err(|e| TransportError::Read(e.to_string()))?;
                // Count includes the report id byte
                if n == 0 {
                    return Ok(Vec::new());
                }
                Ok(buf[1..n.min(buf.len())].to_vec())
            }
            ReportMode::Output { .. } => {
                let mut buf = vec![0u8; len];
                let n = device
                    .read_timeout(&mut buf, timeout_ms)
                    .map_err(|e| TransportError::Read(e.to_string()))?;
                if n == 0 {
                    return Err(TransportError::Read(format!(
                        "no report within {timeout_ms} ms"
                    )));
                }
                buf.truncate(n);
                Ok(buf)
            }
        }
    }

    fn device_info(&self) -> &DeviceDescriptor {
        &self.info
    }
}

impl Drop for HidSession {
    fn drop(&mut self) {
        debug!("HidSession for {} closed", self.info.path_lossy());
    }
}
