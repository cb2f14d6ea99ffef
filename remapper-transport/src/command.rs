//! Type-safe command builders and the firmware-side parser
//!
//! Each command knows its payload layout for every protocol revision that
//! supports it. Layouts are little-endian and packed; the wire structs below
//! are `zerocopy` types so field order and widths are fixed by `#[repr(C)]`.

use zerocopy::byteorder::little_endian::{I16, U16};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::ProtocolError;
use crate::frame::{self, CommandFrame, DecodedFrame};
use crate::protocol::{CommandKind, ProtocolRevision};

/// Size of each string slot in SET_IDENTITY
pub const TEXT_FIELD_SIZE: usize = 32;
/// Longest string that still leaves room for the terminator
pub const TEXT_FIELD_MAX_LEN: usize = TEXT_FIELD_SIZE - 1;

// =============================================================================
// Core Trait
// =============================================================================

/// A command that can be serialized into a [`CommandFrame`]
pub trait HidCommand {
    /// Catalog entry; the command byte depends on the revision
    const KIND: CommandKind;

    /// Serialize the payload (excluding version, command byte and checksum)
    fn to_payload(&self, revision: ProtocolRevision) -> Vec<u8>;

    /// Build the complete frame for `revision`
    fn build(&self, revision: ProtocolRevision) -> Result<CommandFrame, ProtocolError> {
        let id = revision
            .command_id(Self::KIND)
            .ok_or(ProtocolError::UnsupportedCommand {
                command: Self::KIND,
                revision,
            })?;
        frame::encode(
            revision.version(),
            id,
            &self.to_payload(revision),
            revision.frame_size(),
        )
    }
}

// =============================================================================
// Buttons
// =============================================================================

/// Button bits of the INJECT_INPUT buttons byte
pub mod buttons {
    pub const LEFT: u8 = 0x01;
    pub const RIGHT: u8 = 0x02;
    pub const MIDDLE: u8 = 0x04;
    pub const BACK: u8 = 0x08;
    pub const FORWARD: u8 = 0x10;
}

/// Bitmask for logical button `n` (1-indexed): button N → bit N-1
pub fn button_mask(button: u8) -> Option<u8> {
    if (1..=8).contains(&button) {
        Some(1 << (button - 1))
    } else {
        None
    }
}

// =============================================================================
// INJECT_INPUT
// =============================================================================

/// Wire layout of INJECT_INPUT for revision 19 (7 bytes)
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct InjectInputData {
    buttons: u8,
    x: I16,
    y: I16,
    wheel: i8,
    pan: i8,
}

/// Wire layout of INJECT_INPUT for revision 18 (5 bytes, no wheel/pan)
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct LegacyInjectInputData {
    x: I16,
    y: I16,
    buttons: u8,
}

/// Synthetic mouse report: relative motion, button state, wheel and pan.
///
/// Buttons are a state, not an event: a set bit stays pressed until a report
/// with the bit cleared is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InjectInput {
    pub buttons: u8,
    pub x: i16,
    pub y: i16,
    /// Vertical wheel (revision 19 only)
    pub wheel: i8,
    /// Horizontal wheel (revision 19 only)
    pub pan: i8,
}

impl InjectInput {
    /// All-zero report: no motion, all buttons up
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative motion with no buttons pressed
    pub fn motion(x: i16, y: i16) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn buttons(mut self, mask: u8) -> Self {
        self.buttons = mask;
        self
    }

    pub fn wheel(mut self, wheel: i8) -> Self {
        self.wheel = wheel;
        self
    }

    pub fn pan(mut self, pan: i8) -> Self {
        self.pan = pan;
        self
    }

    /// True when wheel or pan would be dropped by `revision`
    pub fn loses_scroll(&self, revision: ProtocolRevision) -> bool {
        revision == ProtocolRevision::V18 && (self.wheel != 0 || self.pan != 0)
    }

    fn from_data(data: &InjectInputData) -> Self {
        Self {
            buttons: data.buttons,
            x: data.x.get(),
            y: data.y.get(),
            wheel: data.wheel,
            pan: data.pan,
        }
    }

    fn from_legacy(data: &LegacyInjectInputData) -> Self {
        Self {
            buttons: data.buttons,
            x: data.x.get(),
            y: data.y.get(),
            ..Self::default()
        }
    }
}

impl HidCommand for InjectInput {
    const KIND: CommandKind = CommandKind::InjectInput;

    fn to_payload(&self, revision: ProtocolRevision) -> Vec<u8> {
        match revision {
            ProtocolRevision::V18 => LegacyInjectInputData {
                x: I16::new(self.x),
                y: I16::new(self.y),
                buttons: self.buttons,
            }
            .as_bytes()
            .to_vec(),
            ProtocolRevision::V19 => InjectInputData {
                buttons: self.buttons,
                x: I16::new(self.x),
                y: I16::new(self.y),
                wheel: self.wheel,
                pan: self.pan,
            }
            .as_bytes()
            .to_vec(),
        }
    }
}

// =============================================================================
// SET_IDENTITY
// =============================================================================

/// A string encoded into a fixed, null-terminated 32-byte slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextField {
    bytes: [u8; TEXT_FIELD_SIZE],
    len: usize,
    truncated: bool,
}

impl TextField {
    /// Encode `text` as UTF-8, keeping at most 31 bytes.
    ///
    /// Truncation happens on a character boundary and is not an error; check
    /// [`truncated`](Self::truncated) to find out whether it happened.
    pub fn encode(text: &str) -> Self {
        let mut len = text.len().min(TEXT_FIELD_MAX_LEN);
        while !text.is_char_boundary(len) {
            len -= 1;
        }
        let mut bytes = [0u8; TEXT_FIELD_SIZE];
        bytes[..len].copy_from_slice(&text.as_bytes()[..len]);
        Self {
            bytes,
            len,
            truncated: len < text.len(),
        }
    }

    /// Read a slot back: bytes up to the first NUL, lossily decoded
    pub fn decode(slot: &[u8]) -> String {
        let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
        String::from_utf8_lossy(&slot[..end]).into_owned()
    }

    pub fn as_bytes(&self) -> &[u8; TEXT_FIELD_SIZE] {
        &self.bytes
    }

    /// Encoded length without the terminator
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

/// Which SET_IDENTITY strings did not fit their slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentityTruncation {
    pub manufacturer: bool,
    pub product: bool,
    pub serial: bool,
}

impl IdentityTruncation {
    pub fn any(&self) -> bool {
        self.manufacturer || self.product || self.serial
    }

    /// Names of the truncated fields, for diagnostics
    pub fn fields(&self) -> Vec<&'static str> {
        [
            (self.manufacturer, "manufacturer"),
            (self.product, "product"),
            (self.serial, "serial"),
        ]
        .into_iter()
        .filter_map(|(hit, name)| hit.then_some(name))
        .collect()
    }
}

/// Wire layout of SET_IDENTITY (102 bytes)
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct SetIdentityData {
    usb_vid: U16,
    usb_pid: U16,
    bcd_device: U16,
    manufacturer: [u8; TEXT_FIELD_SIZE],
    product: [u8; TEXT_FIELD_SIZE],
    serial: [u8; TEXT_FIELD_SIZE],
}

/// USB identity the firmware presents after the next re-enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetIdentity {
    pub usb_vid: u16,
    pub usb_pid: u16,
    /// Device release number in BCD (0x0100 = 1.00)
    pub bcd_device: u16,
    pub manufacturer: String,
    pub product: String,
    pub serial: String,
}

impl SetIdentity {
    pub fn new(
        usb_vid: u16,
        usb_pid: u16,
        bcd_device: u16,
        manufacturer: impl Into<String>,
        product: impl Into<String>,
        serial: impl Into<String>,
    ) -> Self {
        Self {
            usb_vid,
            usb_pid,
            bcd_device,
            manufacturer: manufacturer.into(),
            product: product.into(),
            serial: serial.into(),
        }
    }

    /// Report which strings will be cut to fit their slot
    pub fn truncation(&self) -> IdentityTruncation {
        IdentityTruncation {
            manufacturer: TextField::encode(&self.manufacturer).truncated(),
            product: TextField::encode(&self.product).truncated(),
            serial: TextField::encode(&self.serial).truncated(),
        }
    }

    fn to_data(&self) -> SetIdentityData {
        SetIdentityData {
            usb_vid: U16::new(self.usb_vid),
            usb_pid: U16::new(self.usb_pid),
            bcd_device: U16::new(self.bcd_device),
            manufacturer: *TextField::encode(&self.manufacturer).as_bytes(),
            product: *TextField::encode(&self.product).as_bytes(),
            serial: *TextField::encode(&self.serial).as_bytes(),
        }
    }

    fn from_data(data: &SetIdentityData) -> Self {
        Self {
            usb_vid: data.usb_vid.get(),
            usb_pid: data.usb_pid.get(),
            bcd_device: data.bcd_device.get(),
            manufacturer: TextField::decode(&data.manufacturer),
            product: TextField::decode(&data.product),
            serial: TextField::decode(&data.serial),
        }
    }
}

impl HidCommand for SetIdentity {
    const KIND: CommandKind = CommandKind::SetIdentity;

    fn to_payload(&self, _revision: ProtocolRevision) -> Vec<u8> {
        self.to_data().as_bytes().to_vec()
    }
}

// =============================================================================
// Payload-less commands
// =============================================================================

/// PERSIST_CONFIG: write the running configuration to flash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistConfig;

impl HidCommand for PersistConfig {
    const KIND: CommandKind = CommandKind::PersistConfig;

    fn to_payload(&self, _revision: ProtocolRevision) -> Vec<u8> {
        Vec::new()
    }
}

/// RESET_INTO_BOOTSEL: reboot into the ROM bootloader (device disappears)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetIntoBootloader;

impl HidCommand for ResetIntoBootloader {
    const KIND: CommandKind = CommandKind::ResetIntoBootloader;

    fn to_payload(&self, _revision: ProtocolRevision) -> Vec<u8> {
        Vec::new()
    }
}

// =============================================================================
// Firmware-side parsing
// =============================================================================

/// A frame decoded the way the firmware would interpret it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    InjectInput(InjectInput),
    SetIdentity(SetIdentity),
    PersistConfig,
    ResetIntoBootloader,
}

impl ParsedCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            ParsedCommand::InjectInput(_) => CommandKind::InjectInput,
            ParsedCommand::SetIdentity(_) => CommandKind::SetIdentity,
            ParsedCommand::PersistConfig => CommandKind::PersistConfig,
            ParsedCommand::ResetIntoBootloader => CommandKind::ResetIntoBootloader,
        }
    }
}

/// Validate a decoded frame and interpret its payload.
///
/// Rejects, in order: wrong version, bad checksum, command id outside the
/// revision's catalog.
pub fn try_parse_command(
    decoded: &DecodedFrame,
    revision: ProtocolRevision,
) -> Result<ParsedCommand, ProtocolError> {
    decoded.validate(revision.version())?;
    let kind =
        revision
            .command_kind(decoded.command_id)
            .ok_or(ProtocolError::UnknownCommand {
                command: decoded.command_id,
                revision,
            })?;
    let malformed = ProtocolError::MalformedPayload { command: kind };

    let parsed = match (kind, revision) {
        (CommandKind::InjectInput, ProtocolRevision::V18) => {
            let (data, _) = LegacyInjectInputData::read_from_prefix(&decoded.payload)
                .map_err(|_| malformed)?;
            ParsedCommand::InjectInput(InjectInput::from_legacy(&data))
        }
        (CommandKind::InjectInput, ProtocolRevision::V19) => {
            let (data, _) =
                InjectInputData::read_from_prefix(&decoded.payload).map_err(|_| malformed)?;
            ParsedCommand::InjectInput(InjectInput::from_data(&data))
        }
        (CommandKind::SetIdentity, _) => {
            let (data, _) =
                SetIdentityData::read_from_prefix(&decoded.payload).map_err(|_| malformed)?;
            ParsedCommand::SetIdentity(SetIdentity::from_data(&data))
        }
        (CommandKind::PersistConfig, _) => ParsedCommand::PersistConfig,
        (CommandKind::ResetIntoBootloader, _) => ParsedCommand::ResetIntoBootloader,
    };
    Ok(parsed)
}

/// Decode raw frame bytes for `revision` and parse them
pub fn parse_frame(
    bytes: &[u8],
    revision: ProtocolRevision,
) -> Result<ParsedCommand, ProtocolError> {
    let decoded = frame::decode(bytes, revision.frame_size())?;
    try_parse_command(&decoded, revision)
}

// =============================================================================
// Tests
// =============================================================================
