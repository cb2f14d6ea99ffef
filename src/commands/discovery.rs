//! Discovery command handlers.

use super::{CommandResult, Context};
use remapper_transport::{HidDiscovery, SurveyStatus};

/// Locate the configuration interface and report what was found
pub fn find(ctx: &Context) -> CommandResult {
    let target = ctx.config.device;
    let survey = HidDiscovery::new(target).survey()?;

    match survey.status() {
        SurveyStatus::Absent => {
            println!("No device with VID={:04X} PID={:04X}", target.vid, target.pid);
        }
        SurveyStatus::NotReady => {
            println!(
                "Found {:04X}:{:04X} but no interface with usage page 0x{:04X} usage 0x{:04X}:",
                target.vid, target.pid, target.usage_page, target.usage
            );
            for desc in &survey.candidates {
                println!("  {desc}");
            }
            println!("Is the remapper firmware running? The interface may still be enumerating.");
        }
        SurveyStatus::Ready => {
            if let Some(desc) = survey.config_interface() {
                println!("Configuration interface: {desc}");
                println!("  path: {}", desc.path_lossy());
                if let Some(serial) = &desc.serial {
                    println!("  serial: {serial}");
                }
            }
            println!(
                "{} interface(s) share this VID/PID",
                survey.candidates.len()
            );
        }
    }
    Ok(())
}

/// List HID interfaces, by default only those of the target device
pub fn list(ctx: &Context, all: bool) -> CommandResult {
    let discovery = HidDiscovery::new(ctx.config.device);
    let target = discovery.selector().target();
    let devices = discovery.list_all()?;

    if all {
        println!("All HID interfaces:");
    } else {
        println!("Interfaces of {:04X}:{:04X}:", target.vid, target.pid);
    }
    let mut shown = 0;
    for desc in devices.iter().filter(|d| all || target.matches_device(d)) {
        let marker = if target.matches_interface(desc) { "*" } else { " " };
        println!(
            "{marker} VID={:04x} PID={:04x} page={:04x} usage={:04x} if={} {}",
            desc.vendor_id,
            desc.product_id,
            desc.usage_page,
            desc.usage,
            desc.interface_number,
            desc.path_lossy()
        );
        shown += 1;
    }
    if shown == 0 {
        println!("  (none)");
    }
    Ok(())
}
