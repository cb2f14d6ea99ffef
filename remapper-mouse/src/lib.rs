//! High-level controller for the mouse-remapper firmware
//!
//! Wraps any [`Transport`] and turns semantic operations (move, click,
//! set identity) into framed commands for one protocol revision.

pub mod error;
pub mod pacing;

pub use error::ControllerError;
pub use pacing::Pacing;

pub use remapper_transport::{
    buttons, IdentityTruncation, InjectInput, InterfaceMatch, ProtocolRevision, SetIdentity,
};

use remapper_transport::{
    button_mask, CommandFrame, HidCommand, HidDiscovery, HidSession, PersistConfig,
    ResetIntoBootloader, Transport,
};
use tracing::{debug, info, warn};

/// Mouse controller over any transport
///
/// Commands are issued one at a time from the calling thread; each call
/// returns once the last of its frames has been written.
pub struct MouseController<T: Transport> {
    transport: T,
    revision: ProtocolRevision,
    pacing: Pacing,
}

impl<T: Transport> MouseController<T> {
    /// Create a controller with default pacing
    pub fn new(transport: T, revision: ProtocolRevision) -> Self {
        Self {
            transport,
            revision,
            pacing: Pacing::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Get the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn revision(&self) -> ProtocolRevision {
        self.revision
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    fn send(&self, frame: &CommandFrame) -> Result<(), ControllerError> {
        self.transport.send_frame(frame)?;
        Ok(())
    }

    // === Input injection ===

    /// Inject one raw input report.
    ///
    /// On revision 18 the wheel and pan fields are dropped with a warning.
    pub fn inject(&self, report: InjectInput) -> Result<(), ControllerError> {
        if report.loses_scroll(self.revision) {
            warn!(
                "Protocol {} has no wheel fields; dropping wheel={} pan={}",
                self.revision, report.wheel, report.pan
            );
        }
        let frame = report.build(self.revision)?;
        debug!(
            "inject buttons=0x{:02X} x={} y={} wheel={} pan={}",
            report.buttons, report.x, report.y, report.wheel, report.pan
        );
        self.send(&frame)
    }

    /// Relative pointer motion with all buttons up
    pub fn move_by(&self, dx: i16, dy: i16) -> Result<(), ControllerError> {
        self.inject(InjectInput::motion(dx, dy))
    }

    /// Hold the buttons in `mask` down until [`release`](Self::release)
    pub fn press(&self, mask: u8) -> Result<(), ControllerError> {
        self.inject(InjectInput::new().buttons(mask))
    }

    /// Release every button
    pub fn release(&self) -> Result<(), ControllerError> {
        self.inject(InjectInput::new())
    }

    /// Click logical button `button` (1 = left, 2 = right, 3 = middle, ...).
    ///
    /// Sends a press report, waits `click_hold`, then an all-zero release
    /// report.
    pub fn click(&self, button: u8) -> Result<(), ControllerError> {
        let mask = button_mask(button).ok_or_else(|| {
            ControllerError::InvalidParameter(format!("button {button} is not in 1..=8"))
        })?;
        self.press(mask)?;
        self.pacing.hold();
        self.release().inspect_err(|_| {
            warn!("Release after click failed; button {} may be held", button);
        })
    }

    /// Vertical and horizontal wheel ticks (revision 19 only)
    pub fn scroll(&self, wheel: i8, pan: i8) -> Result<(), ControllerError> {
        if self.revision == ProtocolRevision::V18 {
            return Err(ControllerError::InvalidParameter(format!(
                "protocol {} cannot carry wheel input",
                self.revision
            )));
        }
        self.inject(InjectInput::new().wheel(wheel).pan(pan))
    }

    // === Device configuration ===

    /// Reprogram the USB identity and persist it.
    ///
    /// Two independent writes: SET_IDENTITY, then PERSIST_CONFIG. Strings
    /// longer than 31 bytes are cut; the returned value says which ones.
    /// The new identity takes effect on the next re-enumeration.
    pub fn set_identity(
        &self,
        identity: &SetIdentity,
    ) -> Result<IdentityTruncation, ControllerError> {
        // Frame both before writing either
        let identity_frame = identity.build(self.revision)?;
        let persist_frame = PersistConfig.build(self.revision)?;

        let truncation = identity.truncation();
        if truncation.any() {
            warn!(
                "Identity strings truncated to 31 bytes: {}",
                truncation.fields().join(", ")
            );
        }

        info!(
            "Setting identity {:04X}:{:04X} bcd {:04X} \"{}\" / \"{}\" / \"{}\"",
            identity.usb_vid,
            identity.usb_pid,
            identity.bcd_device,
            identity.manufacturer,
            identity.product,
            identity.serial
        );
        self.send(&identity_frame)?;
        self.pacing.gap();

        if let Err(e) = self.transport.send_frame(&persist_frame) {
            warn!("Identity applied but persist failed; it will not survive a power cycle");
            return Err(ControllerError::IdentityNotPersisted(e));
        }
        Ok(truncation)
    }

    /// Write the running configuration to flash
    pub fn persist_config(&self) -> Result<(), ControllerError> {
        let frame = PersistConfig.build(self.revision)?;
        info!("Persisting configuration");
        self.send(&frame)
    }

    /// Reboot the device into its ROM bootloader.
    ///
    /// The configuration interface disappears, so the controller is consumed.
    pub fn reset_to_bootloader(self) -> Result<(), ControllerError> {
        let frame = ResetIntoBootloader.build(self.revision)?;
        info!("Resetting {} into bootloader", self.transport.device_info());
        self.send(&frame)
    }

    /// Close the session
    pub fn disconnect(self) {
        debug!("Disconnecting from {}", self.transport.device_info());
    }
}

/// Find and open the configuration interface described by `target`, using the
/// revision's default report mode
pub fn open_controller(
    target: &InterfaceMatch,
    revision: ProtocolRevision,
    pacing: Pacing,
) -> Result<MouseController<HidSession>, ControllerError> {
    let session = HidDiscovery::new(*target).open(revision.default_report_mode())?;
    Ok(MouseController::new(session, revision).with_pacing(pacing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use remapper_transport::{DeviceDescriptor, ParsedCommand, RecordingTransport};

    fn controller(revision: ProtocolRevision) -> MouseController<RecordingTransport> {
        let transport = RecordingTransport::new(
            DeviceDescriptor::new(0x046D, 0xC08B, 0xFF00, 0x20),
            revision.default_report_mode(),
        );
        MouseController::new(transport, revision).with_pacing(Pacing::from_millis(1, 0))
    }

    fn parsed(ctl: &MouseController<RecordingTransport>) -> Vec<ParsedCommand> {
        ctl.transport()
            .reports()
            .iter()
            .map(|r| r.parse(ctl.revision()).unwrap())
            .collect()
    }

    #[test]
    fn test_move_by() {
        let ctl = controller(ProtocolRevision::V19);
        ctl.move_by(10, -3).unwrap();
        assert_eq!(
            parsed(&ctl),
            vec![ParsedCommand::InjectInput(InjectInput::motion(10, -3))]
        );
    }

    #[test]
    fn test_invalid_button() {
        let ctl = controller(ProtocolRevision::V19);
        assert!(matches!(
            ctl.click(0),
            Err(ControllerError::InvalidParameter(_))
        ));
        assert!(matches!(
            ctl.click(9),
            Err(ControllerError::InvalidParameter(_))
        ));
        assert!(ctl.transport().is_empty());
    }

    #[test]
    fn test_scroll_needs_v19() {
        let ctl = controller(ProtocolRevision::V18);
        assert!(matches!(
            ctl.scroll(1, 0),
            Err(ControllerError::InvalidParameter(_))
        ));

        let ctl = controller(ProtocolRevision::V19);
        ctl.scroll(-2, 1).unwrap();
        assert_eq!(
            parsed(&ctl),
            vec![ParsedCommand::InjectInput(InjectInput::new().wheel(-2).pan(1))]
        );
    }

    #[test]
    fn test_identity_unsupported_on_v18_sends_nothing() {
        let ctl = controller(ProtocolRevision::V18);
        let identity = SetIdentity::new(0x1234, 0x5678, 0x0100, "a", "b", "c");
        assert!(matches!(
            ctl.set_identity(&identity),
            Err(ControllerError::Protocol(_))
        ));
        assert!(ctl.transport().is_empty());
    }

    #[test]
    fn test_persist_config() {
        let ctl = controller(ProtocolRevision::V19);
        ctl.persist_config().unwrap();
        assert_eq!(parsed(&ctl), vec![ParsedCommand::PersistConfig]);
    }
}
