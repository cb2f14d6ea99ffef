//! Persistent controller configuration
//!
//! Stored as TOML under the user's config directory. Every field has a
//! default, so a missing file or a partial one is fine.

use std::path::{Path, PathBuf};

use remapper_mouse::Pacing;
use remapper_transport::protocol::timing;
use remapper_transport::{InterfaceMatch, ProtocolRevision, ReportMode};
use serde::{Deserialize, Serialize};

/// Pacing delays in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub click_hold_ms: u64,
    pub command_gap_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            click_hold_ms: timing::CLICK_HOLD_MS,
            command_gap_ms: timing::COMMAND_GAP_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Protocol revision the firmware speaks
    pub protocol: ProtocolRevision,
    /// Which interface to open
    pub device: InterfaceMatch,
    /// Report mode override; the revision's default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportMode>,
    pub pacing: PacingConfig,
}

impl ControllerConfig {
    /// `<config dir>/remapper/controller.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("remapper")
            .join("controller.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file, creating parent directories
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply command-line overrides on top of file values
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(vid) = overrides.vid {
            self.device.vid = vid;
        }
        if let Some(pid) = overrides.pid {
            self.device.pid = pid;
        }
        if let Some(page) = overrides.usage_page {
            self.device.usage_page = page;
        }
        if let Some(usage) = overrides.usage {
            self.device.usage = usage;
        }
        if let Some(protocol) = overrides.protocol {
            self.protocol = protocol;
            // A report override written for the other revision would be wrong
            self.report = None;
        }
    }

    /// Report mode to open the interface with
    pub fn report_mode(&self) -> ReportMode {
        self.report
            .unwrap_or_else(|| self.protocol.default_report_mode())
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::from_millis(self.pacing.click_hold_ms, self.pacing.command_gap_ms)
    }
}

/// Values given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub usage_page: Option<u16>,
    pub usage: Option<u16>,
    pub protocol: Option<ProtocolRevision>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.protocol, ProtocolRevision::V19);
        assert_eq!(config.device, InterfaceMatch::default());
        assert_eq!(config.report_mode(), ReportMode::Output { report_id: 0 });
        assert_eq!(config.pacing().click_hold.as_millis(), 50);
    }

    #[test]
    fn test_roundtrip() {
        let mut config = ControllerConfig::default();
        config.report = Some(ReportMode::Feature { report_id: 100 });
        config.pacing.click_hold_ms = 75;

        let text = config.to_toml().unwrap();
        let parsed: ControllerConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let text = r#"
protocol = "v18"

[device]
pid = 0xC08C
"#;
        let config: ControllerConfig = toml::from_str(text).unwrap();
        assert_eq!(config.protocol, ProtocolRevision::V18);
        assert_eq!(config.device.pid, 0xC08C);
        assert_eq!(config.device.vid, 0x046D);
        assert_eq!(config.device.usage_page, 0xFF00);
        assert_eq!(config.report_mode(), ReportMode::Feature { report_id: 100 });
        assert_eq!(config.pacing, PacingConfig::default());
    }

    #[test]
    fn test_report_override() {
        let text = r#"
[report]
mode = "feature"
report_id = 7
"#;
        let config: ControllerConfig = toml::from_str(text).unwrap();
        assert_eq!(config.report_mode(), ReportMode::Feature { report_id: 7 });
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = ControllerConfig {
            report: Some(ReportMode::Feature { report_id: 7 }),
            ..Default::default()
        };
        config.apply_overrides(&Overrides {
            vid: Some(0x1234),
            usage: Some(0x21),
            protocol: Some(ProtocolRevision::V18),
            ..Default::default()
        });
        assert_eq!(config.device.vid, 0x1234);
        assert_eq!(config.device.pid, 0xC08B);
        assert_eq!(config.device.usage, 0x21);
        assert_eq!(config.protocol, ProtocolRevision::V18);
        assert_eq!(config.report, None);
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("remapper-ctl-does-not-exist.toml");
        let config = ControllerConfig::load(&path).unwrap();
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("remapper-ctl-test-{}", std::process::id()));
        let path = dir.join("controller.toml");
        let mut config = ControllerConfig::default();
        config.pacing.command_gap_ms = 10;
        config.save(&path).unwrap();

        assert_eq!(ControllerConfig::load(&path).unwrap(), config);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
