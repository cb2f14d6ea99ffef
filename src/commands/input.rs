//! Input injection command handlers.

use std::thread;
use std::time::Duration;

use super::{with_controller, CommandResult, Context};
use remapper_mouse::Pacing;

/// Move the pointer by a relative offset
pub fn move_by(ctx: &Context, dx: i16, dy: i16) -> CommandResult {
    with_controller(ctx, |ctl| ctl.move_by(dx, dy))?;
    println!("Moved by ({dx}, {dy})");
    Ok(())
}

/// Click a button, optionally overriding the configured hold time
pub fn click(ctx: &Context, button: u8, hold_ms: Option<u64>) -> CommandResult {
    with_controller(ctx, |ctl| {
        let ctl = match hold_ms {
            Some(ms) => {
                let gap = ctl.pacing().command_gap;
                ctl.with_pacing(Pacing {
                    click_hold: Duration::from_millis(ms),
                    command_gap: gap,
                })
            }
            None => ctl,
        };
        ctl.click(button)
    })?;
    println!("Clicked button {button}");
    Ok(())
}

/// Scroll the wheel
pub fn scroll(ctx: &Context, wheel: i8, pan: i8) -> CommandResult {
    with_controller(ctx, |ctl| ctl.scroll(wheel, pan))?;
    println!("Scrolled wheel={wheel} pan={pan}");
    Ok(())
}

/// Relative moves that trace a square of `size` counts, `step` counts at a time
pub fn square_path(size: i16, step: i16) -> Vec<(i16, i16)> {
    let step = step.clamp(1, size.max(1));
    let mut moves = Vec::new();
    for (sx, sy) in [(1i16, 0i16), (0, 1), (-1, 0), (0, -1)] {
        let mut remaining = size;
        while remaining > 0 {
            let n = remaining.min(step);
            moves.push((sx * n, sy * n));
            remaining -= n;
        }
    }
    moves
}

/// Trace a square with the pointer
pub fn square(ctx: &Context, size: i16, step: i16, delay_ms: u64, laps: u32) -> CommandResult {
    if size <= 0 {
        anyhow::bail!("size must be positive");
    }
    let path = square_path(size, step);
    let delay = Duration::from_millis(delay_ms);

    with_controller(ctx, |ctl| {
        for _ in 0..laps {
            for &(dx, dy) in &path {
                ctl.move_by(dx, dy)?;
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
            }
        }
        Ok(())
    })?;
    println!("Traced {laps} square(s) of {size} counts");
    Ok(())
}
