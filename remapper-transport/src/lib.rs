//! Transport layer for the mouse-remapper configuration interface
//!
//! This crate covers everything between a typed command and the bytes on the
//! wire:
//!
//! - Frame codec: fixed-size, CRC-32 protected frames (`frame`)
//! - Command catalog: per-revision command ids and payload layouts (`command`)
//! - Device selection among the composite device's interfaces (`selector`)
//! - HID sessions over `hidapi`, plus an in-memory recorder (`Transport`)
//!
//! ```text
//! [MouseController]                 ← remapper-mouse
//!        |  HidCommand::build
//! [CommandFrame]                    ← frame codec
//!        |  Transport::send_frame
//! [HidSession / RecordingTransport] ← report id + write primitive
//! ```

pub mod command;
pub mod error;
pub mod frame;
pub mod protocol;
pub mod selector;
pub mod types;

mod discovery;
mod hid_session;
mod recording;

pub use command::{
    button_mask, buttons, parse_frame, try_parse_command, HidCommand, IdentityTruncation,
    InjectInput, ParsedCommand, PersistConfig, ResetIntoBootloader, SetIdentity, TextField,
};
pub use error::{ProtocolError, TransportError};
pub use frame::{crc32, decode, encode, CommandFrame, DecodedFrame};
pub use protocol::{CommandKind, ProtocolRevision};
pub use selector::{select, DeviceSelector, InterfaceMatch, Survey, SurveyStatus};
pub use types::{DeviceDescriptor, ReportMode};

pub use discovery::HidDiscovery;
pub use hid_session::{frame_report, HidSession};
pub use recording::{RecordingTransport, SentReport};

use std::sync::Arc;

/// A channel to the configuration interface.
///
/// Writes are fire-and-forget: the firmware sends no acknowledgment, so
/// `send_frame` returning `Ok` only means the OS accepted the report.
pub trait Transport: Send {
    /// Write one frame, prefixed with the transport's report id.
    ///
    /// Blocks until the underlying write completes. No retries.
    fn send_frame(&self, frame: &CommandFrame) -> Result<(), TransportError>;

    /// Read one report back from the device (opt-in, not used by the
    /// command path).
    ///
    /// Returns the report without its report id byte.
    fn read_report(&self, _len: usize, _timeout_ms: i32) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::NotSupported("read_report"))
    }

    /// The interface this transport was opened on
    fn device_info(&self) -> &DeviceDescriptor;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_frame(&self, frame: &CommandFrame) -> Result<(), TransportError> {
        (**self).send_frame(frame)
    }

    fn read_report(&self, len: usize, timeout_ms: i32) -> Result<Vec<u8>, TransportError> {
        (**self).read_report(len, timeout_ms)
    }

    fn device_info(&self) -> &DeviceDescriptor {
        (**self).device_info()
    }
}

impl<T: Transport + Sync + ?Sized> Transport for Arc<T> {
    fn send_frame(&self, frame: &CommandFrame) -> Result<(), TransportError> {
        (**self).send_frame(frame)
    }

    fn read_report(&self, len: usize, timeout_ms: i32) -> Result<Vec<u8>, TransportError> {
        (**self).read_report(len, timeout_ms)
    }

    fn device_info(&self) -> &DeviceDescriptor {
        (**self).device_info()
    }
}
