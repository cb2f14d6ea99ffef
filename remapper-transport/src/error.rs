//! Protocol and transport error types

use thiserror::Error;

use crate::protocol::{CommandKind, ProtocolRevision};

/// Structural errors from the frame codec and command catalog.
///
/// These indicate a programming or compatibility problem and are never
/// worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Payload too large: {len} bytes, frame holds at most {capacity}")]
    PayloadTooLarge { len: usize, capacity: usize },

    #[error("Invalid frame size {0}: must hold a 2-byte header and a 4-byte checksum")]
    InvalidFrameSize(usize),

    #[error("Frame size mismatch: expected {expected} bytes, got {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    ProtocolVersionMismatch { expected: u8, actual: u8 },

    #[error("Checksum invalid: frame carries 0x{stored:08X}, computed 0x{computed:08X}")]
    ChecksumInvalid { stored: u32, computed: u32 },

    #[error("{command} is not supported by protocol {revision}")]
    UnsupportedCommand {
        command: CommandKind,
        revision: ProtocolRevision,
    },

    #[error("Unknown command 0x{command:02X} for protocol {revision}")]
    UnknownCommand {
        command: u8,
        revision: ProtocolRevision,
    },

    #[error("Malformed {command} payload")]
    MalformedPayload { command: CommandKind },
}

/// Errors that can occur while locating, opening or writing to the device
#[derive(Error, Debug)]
pub enum TransportError {
    // Selection
    #[error("Device not found: no HID interface with VID={vid:04X} PID={pid:04X}")]
    DeviceNotFound { vid: u16, pid: u16 },

    #[error(
        "Configuration interface not found: VID={vid:04X} PID={pid:04X} present, \
         but no interface with usage page 0x{usage_page:04X} usage 0x{usage:04X}"
    )]
    ConfigInterfaceNotFound {
        vid: u16,
        pid: u16,
        usage_page: u16,
        usage: u16,
    },

    // Session lifecycle
    #[error("Failed to open {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("HID permission denied: {0}")]
    PermissionDenied(String),

    // I/O after a successful open
    #[error("Write failed: {0}")]
    Write(String),

    #[error("Read failed: {0}")]
    Read(String),

    #[error("HID error: {0}")]
    HidError(String),

    #[error("Operation not supported by this transport: {0}")]
    NotSupported(&'static str),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl TransportError {
    /// Build an open error, promoting permission problems to their own variant
    pub(crate) fn open_failed(path: String, err: &hidapi::HidError) -> Self {
        let reason = err.to_string();
        if is_permission_message(&reason) {
            TransportError::PermissionDenied(format!("{path}: {reason}"))
        } else {
            TransportError::Open { path, reason }
        }
    }

    /// True for errors that depend on the environment (cable, permissions,
    /// enumeration timing) rather than on the request itself
    pub fn is_environmental(&self) -> bool {
        !matches!(self, TransportError::Protocol(_))
    }
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if is_permission_message(&msg) {
            TransportError::PermissionDenied(msg)
        } else {
            TransportError::HidError(msg)
        }
    }
}

fn is_permission_message(msg: &str) -> bool {
    msg.contains("Permission denied") || msg.contains("EPERM") || msg.contains("EACCES")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_errors_are_not_environmental() {
        let err: TransportError = ProtocolError::InvalidFrameSize(4).into();
        assert!(!err.is_environmental());
        assert!(TransportError::Write("gone".into()).is_environmental());
    }

    #[test]
    fn test_selection_messages_carry_ids() {
        let err = TransportError::ConfigInterfaceNotFound {
            vid: 0x046D,
            pid: 0xC08B,
            usage_page: 0xFF00,
            usage: 0x20,
        };
        let msg = err.to_string();
        assert!(msg.contains("046D"));
        assert!(msg.contains("0xFF00"));
        assert!(msg.contains("0x0020"));
    }

    #[test]
    fn test_permission_message_detection() {
        assert!(is_permission_message("open failed: Permission denied"));
        assert!(!is_permission_message("No such device"));
    }
}
