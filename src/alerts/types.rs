//! Alert domain types
//!
//! The closed set of alert kinds, the typed key that scopes every piece of
//! cooldown/threshold state to one monitored condition, and the event
//! payload handed to notification sinks.

use crate::domain::device::DeviceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of alert conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Device stopped answering connectivity checks
    ConnectionLost,
    /// CPU load sustained over threshold
    HighCpu,
    /// Memory usage sustained over threshold
    HighMemory,
    /// Interface link went down
    InterfaceDown,
    /// Bandwidth usage sustained over threshold
    HighBandwidth,
    /// Wireless signal at or below the interference threshold
    WirelessInterference,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionLost => write!(f, "connection_lost"),
            Self::HighCpu => write!(f, "high_cpu"),
            Self::HighMemory => write!(f, "high_memory"),
            Self::InterfaceDown => write!(f, "interface_down"),
            Self::HighBandwidth => write!(f, "high_bandwidth"),
            Self::WirelessInterference => write!(f, "wireless_interference"),
        }
    }
}

impl AlertKind {
    /// Short human-readable headline for notifications
    pub fn headline(&self) -> &'static str {
        match self {
            Self::ConnectionLost => "Connection to device lost",
            Self::HighCpu => "High CPU load",
            Self::HighMemory => "High memory usage",
            Self::InterfaceDown => "Interface down",
            Self::HighBandwidth => "High bandwidth usage",
            Self::WirelessInterference => "Weak wireless signal",
        }
    }
}

/// Typed composite key scoping alert state to one monitored condition
///
/// Distinct kinds, devices, and interfaces never collide, so cooldowns and
/// sustain timers are independent per condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    /// What condition
    pub kind: AlertKind,
    /// On which device
    pub device: DeviceId,
    /// On which interface, where applicable
    pub interface: Option<String>,
}

impl AlertKey {
    /// Key for a device-level condition
    pub fn device(kind: AlertKind, device: DeviceId) -> Self {
        Self {
            kind,
            device,
            interface: None,
        }
    }

    /// Key for an interface-level condition
    pub fn interface(kind: AlertKind, device: DeviceId, interface: impl Into<String>) -> Self {
        Self {
            kind,
            device,
            interface: Some(interface.into()),
        }
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.interface {
            Some(iface) => write!(f, "{}/{}/{}", self.kind, self.device, iface),
            None => write!(f, "{}/{}", self.kind, self.device),
        }
    }
}

/// A fully assembled alert ready for dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    /// Device display name
    pub device_name: String,
    /// Condition that fired
    pub kind: AlertKind,
    /// Headline message
    pub message: String,
    /// Structured detail payload, deterministic key order
    pub details: BTreeMap<String, String>,
}
