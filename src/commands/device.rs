//! Device configuration command handlers.

use super::{with_controller, CommandResult, Context};
use remapper_mouse::SetIdentity;

/// Reprogram the USB identity, then persist it
pub fn set_identity(ctx: &Context, identity: SetIdentity, yes: bool) -> CommandResult {
    println!(
        "New identity: VID={:04X} PID={:04X} bcdDevice={:04X}",
        identity.usb_vid, identity.usb_pid, identity.bcd_device
    );
    println!("  manufacturer: {}", identity.manufacturer);
    println!("  product:      {}", identity.product);
    println!("  serial:       {}", identity.serial);

    let truncation = identity.truncation();
    for field in truncation.fields() {
        println!("  warning: {field} is longer than 31 bytes and will be truncated");
    }

    if !yes && !ctx.dry_run {
        println!();
        println!("The device will enumerate with this identity after the next replug.");
        println!("Re-run with --yes to apply.");
        return Ok(());
    }

    with_controller(ctx, |ctl| ctl.set_identity(&identity).map(|_| ()))?;
    println!("Identity written and persisted. Unplug and replug the device to apply it.");
    Ok(())
}

/// Persist the running configuration
pub fn persist(ctx: &Context) -> CommandResult {
    with_controller(ctx, |ctl| ctl.persist_config())?;
    println!("Configuration persisted");
    Ok(())
}

/// Reboot into the bootloader
pub fn bootloader(ctx: &Context) -> CommandResult {
    with_controller(ctx, |ctl| ctl.reset_to_bootloader())?;
    println!("Device is rebooting into its bootloader");
    Ok(())
}
