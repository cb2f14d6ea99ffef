// CLI definitions using clap

use clap::{Parser, Subcommand};
use remapper_transport::ProtocolRevision;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "remapper-ctl")]
#[command(author, version, about = "Control a mouse running the remapper firmware")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: <config dir>/remapper/controller.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Vendor id of the device (hex with 0x, or decimal)
    #[arg(long, global = true, value_parser = parse_u16)]
    pub vid: Option<u16>,

    /// Product id of the device
    #[arg(long, global = true, value_parser = parse_u16)]
    pub pid: Option<u16>,

    /// Usage page of the configuration interface
    #[arg(long, global = true, value_parser = parse_u16)]
    pub usage_page: Option<u16>,

    /// Usage of the configuration interface
    #[arg(long, global = true, value_parser = parse_u16)]
    pub usage: Option<u16>,

    /// Protocol revision (v18 or v19)
    #[arg(long, global = true)]
    pub protocol: Option<ProtocolRevision>,

    /// Print the reports that would be sent instead of opening the device
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Discovery ===
    /// Locate the configuration interface
    #[command(visible_alias = "f")]
    Find,

    /// List HID interfaces
    #[command(visible_alias = "ls")]
    List {
        /// Include every HID interface, not just the target device's
        #[arg(short, long)]
        all: bool,
    },

    // === Input injection ===
    /// Move the pointer by a relative offset
    #[command(visible_alias = "m")]
    Move {
        #[arg(allow_negative_numbers = true)]
        dx: i16,
        #[arg(allow_negative_numbers = true)]
        dy: i16,
    },

    /// Click a button (1=left, 2=right, 3=middle, 4=back, 5=forward)
    #[command(visible_alias = "c")]
    Click {
        #[arg(default_value_t = 1)]
        button: u8,
        /// Hold time in ms (overrides config)
        #[arg(long)]
        hold_ms: Option<u64>,
    },

    /// Scroll the wheel (protocol v19 only)
    Scroll {
        /// Vertical ticks, positive is up
        #[arg(allow_negative_numbers = true)]
        wheel: i8,
        /// Horizontal ticks
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        pan: i8,
    },

    /// Trace a square with the pointer
    Square {
        /// Side length in counts
        #[arg(long, default_value_t = 200)]
        size: i16,
        /// Counts per report
        #[arg(long, default_value_t = 10)]
        step: i16,
        /// Delay between reports in ms
        #[arg(long, default_value_t = 10)]
        delay_ms: u64,
        /// Number of laps
        #[arg(long, default_value_t = 1)]
        laps: u32,
    },

    // === Device configuration ===
    /// Reprogram the USB identity and persist it (takes effect on replug)
    #[command(visible_alias = "id")]
    SetIdentity {
        #[arg(long, value_parser = parse_u16)]
        usb_vid: u16,
        #[arg(long, value_parser = parse_u16)]
        usb_pid: u16,
        /// Device release in BCD (0x0100 = 1.00)
        #[arg(long, value_parser = parse_u16, default_value = "0x0100")]
        bcd: u16,
        #[arg(long)]
        manufacturer: String,
        #[arg(long)]
        product: String,
        #[arg(long)]
        serial: String,
        /// Apply without further confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Write the running configuration to flash
    Persist,

    /// Reboot into the ROM bootloader for flashing
    #[command(visible_alias = "bootsel")]
    Bootloader,

    /// Show or create the config file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

/// Parse a u16 given as `0x`-prefixed hex or decimal
pub fn parse_u16(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid value '{s}': {e}"))
}
