//! Command handlers for the CLI application.
//!
//! - `discovery`: find, list
//! - `input`: move, click, scroll, square
//! - `device`: set-identity, persist, bootloader
//! - `config`: config show/init/path

pub mod config;
pub mod device;
pub mod discovery;
pub mod input;

use std::path::PathBuf;
use std::sync::Arc;

use remapper_ctl::ControllerConfig;
use remapper_mouse::{ControllerError, MouseController};
use remapper_transport::protocol::cmd;
use remapper_transport::{
    DeviceDescriptor, HidDiscovery, ProtocolRevision, RecordingTransport, SentReport, Transport,
    TransportError,
};
use tracing::info;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Controller over either a live session or a dry-run recorder
pub type Controller = MouseController<Box<dyn Transport>>;

/// Settings shared by every handler
pub struct Context {
    pub config: ControllerConfig,
    pub config_path: PathBuf,
    pub dry_run: bool,
}

/// Open the configured interface and run `f` with a controller on it.
///
/// With `--dry-run` nothing is opened; the reports `f` would have sent are
/// printed afterwards.
pub fn with_controller<F>(ctx: &Context, f: F) -> CommandResult
where
    F: FnOnce(Controller) -> Result<(), ControllerError>,
{
    let config = &ctx.config;
    let revision = config.protocol;
    let mode = config.report_mode();

    if ctx.dry_run {
        let target = config.device;
        let info = DeviceDescriptor::new(target.vid, target.pid, target.usage_page, target.usage);
        let recorder = Arc::new(RecordingTransport::new(info, mode));
        let transport: Box<dyn Transport> = Box::new(Arc::clone(&recorder));
        let ctl = MouseController::new(transport, revision).with_pacing(config.pacing());
        info!("Dry run: protocol {}, {}", revision, mode);

        let outcome = f(ctl);
        print_reports(&recorder.reports(), revision);
        return outcome.map_err(Into::into);
    }

    let session = HidDiscovery::new(config.device)
        .open(mode)
        .map_err(explain_open_error)?;
    let transport: Box<dyn Transport> = Box::new(session);
    let ctl = MouseController::new(transport, revision).with_pacing(config.pacing());
    f(ctl)?;
    Ok(())
}

fn explain_open_error(err: TransportError) -> anyhow::Error {
    let hint = match &err {
        TransportError::PermissionDenied(_) => {
            "no access to the hidraw node; install a udev rule for the device or run as root"
        }
        TransportError::ConfigInterfaceNotFound { .. } => {
            "the device is present but its configuration interface is not; is the remapper firmware running?"
        }
        TransportError::DeviceNotFound { .. } => "is the device plugged in? try `remapper-ctl list --all`",
        _ => "failed to open the configuration interface",
    };
    anyhow::Error::new(err).context(hint)
}

/// Print recorded reports with their offsets from the first one
pub fn print_reports(reports: &[SentReport], revision: ProtocolRevision) {
    let Some(first) = reports.first() else {
        println!("(no reports)");
        return;
    };
    for (i, report) in reports.iter().enumerate() {
        let offset = report.at.duration_since(first.at);
        let wire = report.wire_bytes();
        let id = report.frame.get(1).copied().unwrap_or_default();
        println!(
            "[{i}] +{:>4}ms id={} cmd=0x{:02X} ({}) {} bytes: {:02X?}",
            offset.as_millis(),
            report.report_id,
            id,
            cmd::name(revision, id),
            wire.len(),
            &wire[..wire.len().min(12)]
        );
        match report.parse(revision) {
            Ok(parsed) => println!("      {parsed:?}"),
            Err(e) => println!("      unparseable: {e}"),
        }
    }
}
