//! Configuration system
//!
//! TOML config file parsing with per-alert-kind rule blocks. Defaults are
//! always usable: a missing or corrupt file degrades to the in-memory
//! default configuration, which is only written back on an explicit save.

pub mod file;

pub use file::ConfigFile;

use crate::alerts::AlertKind;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Telemetry source settings
    pub telemetry: TelemetryConfig,
    /// Per-alert-kind rule blocks
    pub alerts: AlertsConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Master switch for the poll loop
    pub enabled: bool,
    /// Seconds between poll sweeps
    pub check_interval_secs: u64,
    /// Timeout for each telemetry request, seconds
    pub connection_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_secs: 60,
            connection_timeout_secs: 10,
        }
    }
}

/// Telemetry source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Base URL of the device-telemetry API
    pub base_url: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
        }
    }
}

/// All per-kind alert rule blocks
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AlertsConfig {
    /// Connection-loss rule
    pub connection_lost: ConnectionLostConfig,
    /// CPU threshold rule
    pub high_cpu: ThresholdRuleConfig,
    /// Memory threshold rule
    pub high_memory: ThresholdRuleConfig,
    /// Interface link-down rule
    pub interface_down: InterfaceDownConfig,
    /// Bandwidth threshold rule
    pub high_bandwidth: ThresholdRuleConfig,
    /// Wireless signal rule
    pub wireless_interference: WirelessRuleConfig,
}

impl AlertsConfig {
    /// Whether a kind is enabled
    pub fn is_enabled(&self, kind: AlertKind) -> bool {
        match kind {
            AlertKind::ConnectionLost => self.connection_lost.enabled,
            AlertKind::HighCpu => self.high_cpu.enabled,
            AlertKind::HighMemory => self.high_memory.enabled,
            AlertKind::InterfaceDown => self.interface_down.enabled,
            AlertKind::HighBandwidth => self.high_bandwidth.enabled,
            AlertKind::WirelessInterference => self.wireless_interference.enabled,
        }
    }

    /// Cooldown window for a kind
    pub fn cooldown(&self, kind: AlertKind) -> Duration {
        let secs = match kind {
            AlertKind::ConnectionLost => self.connection_lost.cooldown_secs,
            AlertKind::HighCpu => self.high_cpu.cooldown_secs,
            AlertKind::HighMemory => self.high_memory.cooldown_secs,
            AlertKind::InterfaceDown => self.interface_down.cooldown_secs,
            AlertKind::HighBandwidth => self.high_bandwidth.cooldown_secs,
            AlertKind::WirelessInterference => self.wireless_interference.cooldown_secs,
        };
        Duration::seconds(secs as i64)
    }
}

/// Connection-loss rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionLostConfig {
    /// Whether the rule is active
    pub enabled: bool,
    /// Consecutive failed polls before the alert arms
    pub retries: u32,
    /// Seconds between repeat fires
    pub cooldown_secs: u64,
}

impl Default for ConnectionLostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retries: 3,
            cooldown_secs: 1800,
        }
    }
}

/// Sustained-threshold rule configuration (CPU, memory, bandwidth)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdRuleConfig {
    /// Whether the rule is active
    pub enabled: bool,
    /// Threshold in percent
    pub threshold: f64,
    /// Seconds the metric must stay over threshold before firing
    pub duration_secs: u64,
    /// Seconds between repeat fires
    pub cooldown_secs: u64,
}

impl Default for ThresholdRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 80.0,
            duration_secs: 300,
            cooldown_secs: 3600,
        }
    }
}

impl ThresholdRuleConfig {
    /// Sustain duration as a chrono Duration
    pub fn sustain(&self) -> Duration {
        Duration::seconds(self.duration_secs as i64)
    }
}

/// Interface link-down rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceDownConfig {
    /// Whether the rule is active
    pub enabled: bool,
    /// Interface names never evaluated
    pub excluded_interfaces: Vec<String>,
    /// Seconds between repeat fires
    pub cooldown_secs: u64,
}

impl Default for InterfaceDownConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            excluded_interfaces: vec!["lo".to_string()],
            cooldown_secs: 1800,
        }
    }
}

impl InterfaceDownConfig {
    /// Whether an interface name is on the exclusion list
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_interfaces.iter().any(|n| n == name)
    }
}

/// Wireless interference rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WirelessRuleConfig {
    /// Whether the rule is active
    pub enabled: bool,
    /// Signal strength in dBm at or below which the alert arms
    pub signal_threshold: i32,
    /// Seconds between repeat fires
    pub cooldown_secs: u64,
}

impl Default for WirelessRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            signal_threshold: -80,
            cooldown_secs: 3600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.general.enabled);
        assert_eq!(config.general.check_interval_secs, 60);
        assert_eq!(config.general.connection_timeout_secs, 10);
        assert_eq!(config.telemetry.base_url, "http://localhost:3000/api");
        assert_eq!(config.alerts.connection_lost.retries, 3);
        assert_eq!(config.alerts.high_cpu.threshold, 80.0);
        assert_eq!(config.alerts.wireless_interference.signal_threshold, -80);
        assert!(config.alerts.interface_down.is_excluded("lo"));
    }

    #[test]
    fn test_cooldown_lookup() {
        let config = Config::default();
        assert_eq!(
            config.alerts.cooldown(AlertKind::ConnectionLost),
            Duration::seconds(1800)
        );
        assert_eq!(
            config.alerts.cooldown(AlertKind::HighCpu),
            Duration::seconds(3600)
        );
    }

    #[test]
    fn test_enabled_lookup() {
        let mut config = Config::default();
        config.alerts.high_memory.enabled = false;
        assert!(config.alerts.is_enabled(AlertKind::HighCpu));
        assert!(!config.alerts.is_enabled(AlertKind::HighMemory));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r#"
            [general]
            check_interval_secs = 30

            [alerts.high_cpu]
            threshold = 90.0
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.check_interval_secs, 30);
        assert_eq!(config.general.connection_timeout_secs, 10);
        assert_eq!(config.alerts.high_cpu.threshold, 90.0);
        assert_eq!(config.alerts.high_cpu.duration_secs, 300);
        assert_eq!(config.alerts.high_memory.threshold, 80.0);
    }
}
