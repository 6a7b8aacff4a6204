//! Device telemetry value types
//!
//! These are the normalized shapes the rest of the engine works with. The
//! telemetry boundary is responsible for mapping wire formats into them;
//! nothing past that boundary sees raw API payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a monitored device, assigned by the telemetry source
pub type DeviceId = i64;

/// A device as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRef {
    /// Device id
    pub id: DeviceId,
    /// Human-readable name
    #[serde(default)]
    pub name: String,
}

impl DeviceRef {
    /// Display name, falling back to the id when the source gave none
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Device #{}", self.id)
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Snapshot of a device's resource usage
///
/// Canonical memory shape is used/total; the telemetry boundary normalizes
/// sources that report total/free instead.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// CPU load in percent
    pub cpu_load: f64,
    /// Memory in use, bytes
    pub memory_used: u64,
    /// Total memory, bytes
    pub memory_total: u64,
}

impl ResourceSnapshot {
    /// Memory usage in percent
    ///
    /// Returns `None` when the total is unknown (zero); the memory check is
    /// skipped entirely in that case rather than alerting on garbage.
    pub fn memory_percent(&self) -> Option<f64> {
        if self.memory_total == 0 {
            return None;
        }
        Some((self.memory_used as f64 / self.memory_total as f64) * 100.0)
    }
}

/// Parse a CPU load value that may arrive as a number or a percent string
///
/// `"85%"`, `"85"`, and `85` all resolve to `85.0`. Anything unparseable
/// defaults to 0.
pub fn parse_cpu_load(raw: &serde_json::Value) -> f64 {
    match raw {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim_end_matches('%').trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// A network interface as reported by the telemetry source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    /// Interface name, unique per device
    pub name: String,
    /// Whether the link is up
    #[serde(default)]
    pub running: bool,
    /// Administratively disabled interfaces are skipped entirely
    #[serde(default)]
    pub disabled: bool,
    /// Interface type string, e.g. "ether", "wlan"
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Explicit link speed, e.g. "1Gbps"
    #[serde(default)]
    pub speed: Option<String>,
    /// Alternate speed attribute some sources report
    #[serde(default, rename = "max-speed")]
    pub max_speed: Option<String>,
    /// MAC address, included in link-down alert details when known
    #[serde(default, rename = "macAddress")]
    pub mac_address: Option<String>,
    /// Signal strength in dBm, wireless interfaces only
    #[serde(default, rename = "signalStrength")]
    pub signal_strength: Option<i32>,
}

impl InterfaceRecord {
    /// Create a minimal record, mostly useful in tests
    pub fn new(name: impl Into<String>, running: bool) -> Self {
        Self {
            name: name.into(),
            running,
            disabled: false,
            kind: String::new(),
            speed: None,
            max_speed: None,
            mac_address: None,
            signal_strength: None,
        }
    }

    /// Whether the type string marks this as a wireless interface
    pub fn is_wireless(&self) -> bool {
        let kind = self.kind.to_lowercase();
        kind.contains("wifi") || kind.contains("wireless") || kind.contains("wlan")
    }
}

/// Live traffic reading for one interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrafficReading {
    /// Receive rate in bits per second
    #[serde(default, alias = "rx_bits_per_second", rename = "rxBitsPerSecond")]
    pub rx_bits_per_second: u64,
    /// Transmit rate in bits per second
    #[serde(default, alias = "tx_bits_per_second", rename = "txBitsPerSecond")]
    pub tx_bits_per_second: u64,
}

impl TrafficReading {
    /// The busier direction, used as the numerator for usage percent
    pub fn peak(&self) -> u64 {
        self.rx_bits_per_second.max(self.tx_bits_per_second)
    }
}
