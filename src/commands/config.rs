//! Config file command handlers.

use anyhow::Context as _;

use super::{CommandResult, Context};
use remapper_ctl::ControllerConfig;

/// Print the effective configuration (file plus command-line overrides)
pub fn show(ctx: &Context) -> CommandResult {
    println!("# {}", ctx.config_path.display());
    if !ctx.config_path.exists() {
        println!("# (file not found, showing defaults)");
    }
    print!("{}", ctx.config.to_toml()?);
    Ok(())
}

/// Write the default configuration
pub fn init(ctx: &Context, force: bool) -> CommandResult {
    let path = &ctx.config_path;
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }
    ControllerConfig::default()
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Print the config file location
pub fn path(ctx: &Context) -> CommandResult {
    println!("{}", ctx.config_path.display());
    Ok(())
}
