//! Sleep-based pacing between dependent frames
//!
//! The firmware samples injected input rather than queueing it, so a press and
//! its release must be separated by real time to register as two edges.

use std::time::Duration;

use remapper_transport::protocol::timing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// How long a clicked button stays down
    pub click_hold: Duration,
    /// Gap between the frames of a multi-frame operation
    pub command_gap: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            click_hold: Duration::from_millis(timing::CLICK_HOLD_MS),
            command_gap: Duration::from_millis(timing::COMMAND_GAP_MS),
        }
    }
}

impl Pacing {
    pub fn from_millis(click_hold_ms: u64, command_gap_ms: u64) -> Self {
        Self {
            click_hold: Duration::from_millis(click_hold_ms),
            command_gap: Duration::from_millis(command_gap_ms),
        }
    }

    pub(crate) fn hold(&self) {
        pause(self.click_hold);
    }

    pub(crate) fn gap(&self) {
        pause(self.command_gap);
    }
}

fn pause(d: Duration) {
    if !d.is_zero() {
        std::thread::sleep(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hold_is_50ms() {
        let pacing = Pacing::default();
        assert_eq!(pacing.click_hold, Duration::from_millis(50));
        assert!(pacing.command_gap.is_zero());
    }

    #[test]
    fn test_from_millis() {
        let pacing = Pacing::from_millis(80, 5);
        assert_eq!(pacing.click_hold.as_millis(), 80);
        assert_eq!(pacing.command_gap.as_millis(), 5);
    }
}
