//! Protocol constants for the mouse-remapper configuration interface
//!
//! The firmware has shipped two incompatible framing revisions. Their command
//! tables reuse ids with different meanings, so every lookup goes through a
//! [`ProtocolRevision`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ReportMode;

/// Frame header: `[version][command]`
pub const HEADER_SIZE: usize = 2;
/// CRC-32 trailer
pub const CHECKSUM_SIZE: usize = 4;

/// Config commands, per protocol revision
pub mod cmd {
    use super::ProtocolRevision;

    /// Revision 18: 32-byte frames, input injection only
    pub mod v18 {
        pub const INJECT_INPUT: u8 = 0x42;
    }

    /// Revision 19: 128-byte frames, full command set
    pub mod v19 {
        pub const RESET_INTO_BOOTSEL: u8 = 1;
        pub const PERSIST_CONFIG: u8 = 7;
        pub const SET_IDENTITY: u8 = 26;
        pub const INJECT_INPUT: u8 = 27;
    }

    /// Get human-readable name for a command byte
    pub fn name(revision: ProtocolRevision, id: u8) -> &'static str {
        match revision.command_kind(id) {
            Some(kind) => kind.name(),
            None => "UNKNOWN",
        }
    }
}

/// Default identity of the device the firmware impersonates
pub mod device {
    /// Logitech vendor ID
    pub const VENDOR_ID: u16 = 0x046D;
    /// G502 HERO product ID
    pub const PRODUCT_ID: u16 = 0xC08B;

    /// Vendor-defined usage page of the configuration interface
    pub const CONFIG_USAGE_PAGE: u16 = 0xFF00;
    /// Usage of the configuration interface
    pub const CONFIG_USAGE: u16 = 0x20;
}

/// Report ids used to address the configuration report
pub mod report {
    /// Feature report id of the revision 18 config report
    pub const CONFIG_FEATURE_REPORT_ID: u8 = 100;
    /// Unnumbered output report (hidapi expects a leading 0)
    pub const OUTPUT_REPORT_ID: u8 = 0;
}

/// Pacing constants
pub mod timing {
    /// Time a button is held between press and release frames (ms).
    /// The firmware samples injected input, so shorter holds can be missed.
    pub const CLICK_HOLD_MS: u64 = 50;
    /// Gap between dependent writes such as SetIdentity → PersistConfig (ms)
    pub const COMMAND_GAP_MS: u64 = 0;
    /// Default timeout for the opt-in response read (ms)
    pub const READ_TIMEOUT_MS: i32 = 500;
}

/// Logical commands known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    InjectInput,
    SetIdentity,
    PersistConfig,
    ResetIntoBootloader,
}

impl CommandKind {
    pub const ALL: [CommandKind; 4] = [
        CommandKind::InjectInput,
        CommandKind::SetIdentity,
        CommandKind::PersistConfig,
        CommandKind::ResetIntoBootloader,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::InjectInput => "INJECT_INPUT",
            CommandKind::SetIdentity => "SET_IDENTITY",
            CommandKind::PersistConfig => "PERSIST_CONFIG",
            CommandKind::ResetIntoBootloader => "RESET_INTO_BOOTSEL",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Framing revision spoken by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProtocolRevision {
    /// Version 18: `[18][cmd][26 bytes][crc32]`, input injection only
    #[serde(rename = "v18")]
    V18,
    /// Version 19: `[19][cmd][122 bytes][crc32]`, identity and persistence
    #[default]
    #[serde(rename = "v19")]
    V19,
}

impl ProtocolRevision {
    pub const ALL: [ProtocolRevision; 2] = [ProtocolRevision::V18, ProtocolRevision::V19];

    /// Version byte at offset 0 of every frame
    pub const fn version(self) -> u8 {
        match self {
            ProtocolRevision::V18 => 18,
            ProtocolRevision::V19 => 19,
        }
    }

    /// Total frame size including header and checksum
    pub const fn frame_size(self) -> usize {
        match self {
            ProtocolRevision::V18 => 32,
            ProtocolRevision::V19 => 128,
        }
    }

    /// Payload bytes available between header and checksum
    pub const fn payload_capacity(self) -> usize {
        self.frame_size() - HEADER_SIZE - CHECKSUM_SIZE
    }

    /// Report framing the firmware expects for this revision
    pub const fn default_report_mode(self) -> ReportMode {
        match self {
            ProtocolRevision::V18 => ReportMode::Feature {
                report_id: report::CONFIG_FEATURE_REPORT_ID,
            },
            ProtocolRevision::V19 => ReportMode::Output {
                report_id: report::OUTPUT_REPORT_ID,
            },
        }
    }

    /// Command byte for `kind`, or `None` if this revision lacks it
    pub fn command_id(self, kind: CommandKind) -> Option<u8> {
        match (self, kind) {
            (ProtocolRevision::V18, CommandKind::InjectInput) => Some(cmd::v18::INJECT_INPUT),
            (ProtocolRevision::V18, _) => None,
            (ProtocolRevision::V19, CommandKind::InjectInput) => Some(cmd::v19::INJECT_INPUT),
            (ProtocolRevision::V19, CommandKind::SetIdentity) => Some(cmd::v19::SET_IDENTITY),
            (ProtocolRevision::V19, CommandKind::PersistConfig) => Some(cmd::v19::PERSIST_CONFIG),
            (ProtocolRevision::V19, CommandKind::ResetIntoBootloader) => {
                Some(cmd::v19::RESET_INTO_BOOTSEL)
            }
        }
    }

    /// Reverse lookup of [`command_id`](Self::command_id)
    pub fn command_kind(self, id: u8) -> Option<CommandKind> {
        CommandKind::ALL
            .into_iter()
            .find(|&kind| self.command_id(kind) == Some(id))
    }

    /// Check if this revision can issue `kind`
    pub fn supports(self, kind: CommandKind) -> bool {
        self.command_id(kind).is_some()
    }
}

impl fmt::Display for ProtocolRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.version())
    }
}

impl FromStr for ProtocolRevision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "18" | "v18" => Ok(ProtocolRevision::V18),
            "19" | "v19" => Ok(ProtocolRevision::V19),
            _ => Err(format!("unknown protocol revision: \"{s}\". Use v18 or v19")),
        }
    }
}
