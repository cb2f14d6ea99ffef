//! Picking the configuration interface out of an enumeration
//!
//! The remapper enumerates as a composite device: standard mouse and keyboard
//! interfaces plus one vendor-defined configuration interface, all under the
//! same VID/PID. Only the usage page/usage pair identifies the right one.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TransportError;
use crate::protocol::device;
use crate::types::DeviceDescriptor;

/// Identity of the interface to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceMatch {
    pub vid: u16,
    pub pid: u16,
    pub usage_page: u16,
    pub usage: u16,
}

impl Default for InterfaceMatch {
    fn default() -> Self {
        Self {
            vid: device::VENDOR_ID,
            pid: device::PRODUCT_ID,
            usage_page: device::CONFIG_USAGE_PAGE,
            usage: device::CONFIG_USAGE,
        }
    }
}

impl InterfaceMatch {
    pub fn new(vid: u16, pid: u16, usage_page: u16, usage: u16) -> Self {
        Self {
            vid,
            pid,
            usage_page,
            usage,
        }
    }

    /// Same VID/PID, any interface
    pub fn matches_device(&self, desc: &DeviceDescriptor) -> bool {
        desc.vendor_id == self.vid && desc.product_id == self.pid
    }

    /// Same VID/PID and the configuration usage
    pub fn matches_interface(&self, desc: &DeviceDescriptor) -> bool {
        self.matches_device(desc) && desc.usage_page == self.usage_page && desc.usage == self.usage
    }
}

/// Outcome of looking for the device, without treating absence as an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyStatus {
    /// Nothing with the target VID/PID
    Absent,
    /// VID/PID present but no configuration interface: a genuine device
    /// with the same ids, or the OS has not enumerated the vendor interface yet
    NotReady,
    /// Configuration interface found
    Ready,
}

/// Every interface sharing the target VID/PID, plus the selected one
#[derive(Debug, Clone, Default)]
pub struct Survey {
    pub candidates: Vec<DeviceDescriptor>,
    /// Index into `candidates` of the configuration interface
    pub config_index: Option<usize>,
}

impl Survey {
    pub fn status(&self) -> SurveyStatus {
        match (self.candidates.is_empty(), self.config_index) {
            (true, _) => SurveyStatus::Absent,
            (false, None) => SurveyStatus::NotReady,
            (false, Some(_)) => SurveyStatus::Ready,
        }
    }

    pub fn config_interface(&self) -> Option<&DeviceDescriptor> {
        self.config_index.map(|i| &self.candidates[i])
    }
}

/// Deterministic selector over an enumeration, bound to one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceSelector {
    target: InterfaceMatch,
}

impl DeviceSelector {
    pub fn new(target: InterfaceMatch) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &InterfaceMatch {
        &self.target
    }

    /// First configuration interface in enumeration order.
    ///
    /// `DeviceNotFound` if nothing has the target VID/PID,
    /// `ConfigInterfaceNotFound` if the device is there but the vendor
    /// interface is not.
    pub fn select<'a>(
        &self,
        descriptors: &'a [DeviceDescriptor],
    ) -> Result<&'a DeviceDescriptor, TransportError> {
        let t = &self.target;
        let mut seen_device = false;
        for desc in descriptors {
            if !t.matches_device(desc) {
                continue;
            }
            seen_device = true;
            if t.matches_interface(desc) {
                debug!("Selected configuration interface: {}", desc);
                return Ok(desc);
            }
            debug!(
                "Skipping interface {} (page 0x{:04X} usage 0x{:04X})",
                desc.interface_number, desc.usage_page, desc.usage
            );
        }

        if seen_device {
            Err(TransportError::ConfigInterfaceNotFound {
                vid: t.vid,
                pid: t.pid,
                usage_page: t.usage_page,
                usage: t.usage,
            })
        } else {
            Err(TransportError::DeviceNotFound {
                vid: t.vid,
                pid: t.pid,
            })
        }
    }

    /// Collect all VID/PID matches for diagnostics
    pub fn survey(&self, descriptors: &[DeviceDescriptor]) -> Survey {
        let candidates: Vec<DeviceDescriptor> = descriptors
            .iter()
            .filter(|d| self.target.matches_device(d))
            .cloned()
            .collect();
        let config_index = candidates
            .iter()
            .position(|d| self.target.matches_interface(d));
        Survey {
            candidates,
            config_index,
        }
    }
}

/// Select with explicit ids; see [`DeviceSelector::select`]
pub fn select(
    descriptors: &[DeviceDescriptor],
    vid: u16,
    pid: u16,
    usage_page: u16,
    usage: u16,
) -> Result<&DeviceDescriptor, TransportError> {
    DeviceSelector::new(InterfaceMatch::new(vid, pid, usage_page, usage)).select(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn g502_interfaces() -> Vec<DeviceDescriptor> {
        vec![
            DeviceDescriptor::new(0x046D, 0xC08B, 0x0001, 0x0002)
                .with_interface(0)
                .with_path(CString::new("mouse").unwrap()),
            DeviceDescriptor::new(0x046D, 0xC08B, 0xFF00, 0x0020)
                .with_interface(2)
                .with_path(CString::new("config").unwrap()),
        ]
    }

    #[test]
    fn test_selects_vendor_interface() {
        let list = g502_interfaces();
        let chosen = select(&list, 0x046D, 0xC08B, 0xFF00, 0x0020).unwrap();
        assert_eq!(chosen, &list[1]);
    }

    #[test]
    fn test_other_vid_is_device_not_found() {
        let list = g502_interfaces();
        let err = select(&list, 0x1234, 0xC08B, 0xFF00, 0x0020).unwrap_err();
        assert!(matches!(
            err,
            TransportError::DeviceNotFound {
                vid: 0x1234,
                pid: 0xC08B
            }
        ));
    }

    #[test]
    fn test_missing_usage_is_config_interface_not_found() {
        let list = g502_interfaces();
        let err = select(&list, 0x046D, 0xC08B, 0xFF00, 0x0021).unwrap_err();
        assert!(matches!(
            err,
            TransportError::ConfigInterfaceNotFound { usage: 0x0021, .. }
        ));
    }

    #[test]
    fn test_empty_enumeration() {
        assert!(matches!(
            DeviceSelector::default().select(&[]),
            Err(TransportError::DeviceNotFound { .. })
        ));
    }

    #[test]
    fn test_first_match_wins() {
        let mut list = g502_interfaces();
        list.push(
            DeviceDescriptor::new(0x046D, 0xC08B, 0xFF00, 0x0020)
                .with_path(CString::new("config-2").unwrap()),
        );
        let chosen = DeviceSelector::default().select(&list).unwrap();
        assert_eq!(chosen.path.to_str().unwrap(), "config");
    }

    #[test]
    fn test_survey_status() {
        let selector = DeviceSelector::default();
        let list = g502_interfaces();

        let survey = selector.survey(&list);
        assert_eq!(survey.status(), SurveyStatus::Ready);
        assert_eq!(survey.candidates.len(), 2);
        assert_eq!(survey.config_interface(), Some(&list[1]));

        let survey = selector.survey(&list[..1]);
        assert_eq!(survey.status(), SurveyStatus::NotReady);

        assert_eq!(selector.survey(&[]).status(), SurveyStatus::Absent);
    }
}
