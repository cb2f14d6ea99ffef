//! Common types for the transport layer

use std::ffi::CString;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One enumerated HID interface.
///
/// Composite devices show up once per interface, all sharing the same
/// VID/PID; the usage page and usage tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// USB Vendor ID
    pub vendor_id: u16,
    /// USB Product ID
    pub product_id: u16,
    /// Top-level usage page of the interface's report descriptor
    pub usage_page: u16,
    /// Top-level usage within `usage_page`
    pub usage: u16,
    /// USB interface number (-1 when the platform does not report it)
    pub interface_number: i32,
    /// Platform device path, passed back verbatim to open
    pub path: CString,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial: Option<String>,
}

impl DeviceDescriptor {
    /// Descriptor with only the matching fields set (path empty, no strings)
    pub fn new(vendor_id: u16, product_id: u16, usage_page: u16, usage: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            usage_page,
            usage,
            interface_number: -1,
            path: CString::default(),
            manufacturer: None,
            product: None,
            serial: None,
        }
    }

    /// Set the platform path
    pub fn with_path(mut self, path: CString) -> Self {
        self.path = path;
        self
    }

    /// Set the interface number
    pub fn with_interface(mut self, interface_number: i32) -> Self {
        self.interface_number = interface_number;
        self
    }

    /// Path as printable text
    pub fn path_lossy(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl From<&hidapi::DeviceInfo> for DeviceDescriptor {
    fn from(info: &hidapi::DeviceInfo) -> Self {
        Self {
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            usage_page: info.usage_page(),
            usage: info.usage(),
            interface_number: info.interface_number(),
            path: info.path().to_owned(),
            manufacturer: info.manufacturer_string().map(str::to_string),
            product: info.product_string().map(str::to_string),
            serial: info.serial_number().map(str::to_string),
        }
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VID={:04X} PID={:04X} if={} page=0x{:04X} usage=0x{:04X} path={}",
            self.vendor_id,
            self.product_id,
            self.interface_number,
            self.usage_page,
            self.usage,
            self.path.to_string_lossy()
        )
    }
}

/// Which HID write primitive carries a frame, and the report id byte
/// prepended to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ReportMode {
    /// `send_feature_report` (SET_REPORT on the control endpoint)
    Feature { report_id: u8 },
    /// Plain `write` (output report on the interrupt endpoint)
    Output { report_id: u8 },
}

impl ReportMode {
    pub fn report_id(self) -> u8 {
        match self {
            ReportMode::Feature { report_id } | ReportMode::Output { report_id } => report_id,
        }
    }

    pub fn is_feature(self) -> bool {
        matches!(self, ReportMode::Feature { .. })
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportMode::Feature { report_id } => write!(f, "feature report {report_id}"),
            ReportMode::Output { report_id } => write!(f, "output report {report_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_display() {
        let desc = DeviceDescriptor::new(0x046D, 0xC08B, 0xFF00, 0x20)
            .with_interface(2)
            .with_path(CString::new("/dev/hidraw3").unwrap());
        let text = desc.to_string();
        assert!(text.contains("VID=046D"));
        assert!(text.contains("if=2"));
        assert!(text.contains("/dev/hidraw3"));
    }

    #[test]
    fn test_report_mode_id() {
        assert_eq!(ReportMode::Feature { report_id: 100 }.report_id(), 100);
        assert!(!ReportMode::Output { report_id: 0 }.is_feature());
    }
}
