//! Remapper controller CLI
//!
//! Drives a mouse running the remapper firmware through its vendor-defined
//! HID configuration interface.

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use remapper_ctl::{ControllerConfig, Overrides};
use remapper_mouse::SetIdentity;

// CLI definitions
mod cli;
use cli::{Cli, Commands, ConfigCommands};

// Command handlers
mod commands;
use commands::Context;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --log-level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(ControllerConfig::default_path);
    let mut config = ControllerConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    config.apply_overrides(&Overrides {
        vid: cli.vid,
        pid: cli.pid,
        usage_page: cli.usage_page,
        usage: cli.usage,
        protocol: cli.protocol,
    });

    let ctx = Context {
        config,
        config_path,
        dry_run: cli.dry_run,
    };

    match cli.command {
        // === Discovery ===
        Commands::Find => commands::discovery::find(&ctx),
        Commands::List { all } => commands::discovery::list(&ctx, all),

        // === Input injection ===
        Commands::Move { dx, dy } => commands::input::move_by(&ctx, dx, dy),
        Commands::Click { button, hold_ms } => commands::input::click(&ctx, button, hold_ms),
        Commands::Scroll { wheel, pan } => commands::input::scroll(&ctx, wheel, pan),
        Commands::Square {
            size,
            step,
            delay_ms,
            laps,
        } => commands::input::square(&ctx, size, step, delay_ms, laps),

        // === Device configuration ===
        Commands::SetIdentity {
            usb_vid,
            usb_pid,
            bcd,
            manufacturer,
            product,
            serial,
            yes,
        } => {
            let identity =
                SetIdentity::new(usb_vid, usb_pid, bcd, manufacturer, product, serial);
            commands::device::set_identity(&ctx, identity, yes)
        }
        Commands::Persist => commands::device::persist(&ctx),
        Commands::Bootloader => commands::device::bootloader(&ctx),

        // === Config file ===
        Commands::Config(ConfigCommands::Show) => commands::config::show(&ctx),
        Commands::Config(ConfigCommands::Init { force }) => commands::config::init(&ctx, force),
        Commands::Config(ConfigCommands::Path) => commands::config::path(&ctx),
    }
}
