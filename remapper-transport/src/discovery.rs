//! Device discovery through `hidapi`

use hidapi::HidApi;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::hid_session::HidSession;
use crate::selector::{DeviceSelector, InterfaceMatch, Survey, SurveyStatus};
use crate::types::{DeviceDescriptor, ReportMode};

/// Enumerates HID interfaces and opens the configuration interface
#[derive(Debug, Clone, Default)]
pub struct HidDiscovery {
    selector: DeviceSelector,
}

impl HidDiscovery {
    pub fn new(target: InterfaceMatch) -> Self {
        Self {
            selector: DeviceSelector::new(target),
        }
    }

    pub fn selector(&self) -> &DeviceSelector {
        &self.selector
    }

    /// Snapshot of every interface known to `api`, in enumeration order
    pub fn enumerate(api: &HidApi) -> Vec<DeviceDescriptor> {
        api.device_list().map(DeviceDescriptor::from).collect()
    }

    /// Every HID interface on the system
    pub fn list_all(&self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        let api = HidApi::new()?;
        Ok(Self::enumerate(&api))
    }

    /// All interfaces sharing the target VID/PID and which one is the
    /// configuration interface
    pub fn survey(&self) -> Result<Survey, TransportError> {
        let survey = self.selector.survey(&self.list_all()?);
        debug!(
            "Survey: {} candidate interfaces, status {:?}",
            survey.candidates.len(),
            survey.status()
        );
        Ok(survey)
    }

    /// Locate the configuration interface without opening it
    pub fn find(&self) -> Result<DeviceDescriptor, TransportError> {
        let devices = self.list_all()?;
        self.selector.select(&devices).cloned()
    }

    /// Locate and open the configuration interface
    pub fn open(&self, report_mode: ReportMode) -> Result<HidSession, TransportError> {
        let api = HidApi::new()?;
        let devices = Self::enumerate(&api);
        let target = self.selector.target();
        info!(
            "Looking for {:04X}:{:04X} usage page 0x{:04X} usage 0x{:04X} among {} interfaces",
            target.vid,
            target.pid,
            target.usage_page,
            target.usage,
            devices.len()
        );

        let descriptor = match self.selector.select(&devices) {
            Ok(desc) => desc.clone(),
            Err(e) => {
                if self.selector.survey(&devices).status() == SurveyStatus::NotReady {
                    warn!("Device present but configuration interface missing; it may still be enumerating");
                }
                return Err(e);
            }
        };

        HidSession::open(&api, descriptor, report_mode)
    }
}
