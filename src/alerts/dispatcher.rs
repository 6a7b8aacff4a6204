//! Alert dispatch
//!
//! The boundary call to the notification sink. Every attempt goes through
//! the per-kind enable flag and the cooldown gate; what passes is
//! assembled into a structured detail payload and handed to the sink.
//!
//! Delivery is fire-and-forget: the gate advances before the sink is
//! called, so a failed send is not retried until the cooldown elapses
//! again. At most one delivery attempt per cooldown window.

use crate::alerts::cooldown::CooldownGate;
use crate::alerts::types::{AlertEvent, AlertKey, AlertKind};
use crate::config::AlertsConfig;
use crate::domain::{format_bits, DeviceRef, InterfaceRecord, TrendSummary};
use crate::notify::AlertSink;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cooldown-gated boundary to the notification sink
pub struct AlertDispatcher {
    config: AlertsConfig,
    gate: CooldownGate,
    sink: Box<dyn AlertSink>,
}

impl AlertDispatcher {
    /// Create a dispatcher over the given sink
    pub fn new(config: AlertsConfig, sink: Box<dyn AlertSink>) -> Self {
        Self {
            config,
            gate: CooldownGate::new(),
            sink,
        }
    }

    /// Connection-loss alert after the retry budget is exhausted
    pub fn connection_lost(&mut self, device: &DeviceRef, failures: u32, now: DateTime<Utc>) -> bool {
        let key = AlertKey::device(AlertKind::ConnectionLost, device.id);
        let mut details = self.base_details(device, now);
        details.insert("consecutive_failures".to_string(), failures.to_string());
        self.dispatch(key, device, details, now)
    }

    /// Sustained high CPU load
    pub fn high_cpu(
        &mut self,
        device: &DeviceRef,
        cpu_load: f64,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> bool {
        let key = AlertKey::device(AlertKind::HighCpu, device.id);
        let mut details = self.base_details(device, now);
        details.insert("cpu_load".to_string(), format!("{:.1}%", cpu_load));
        details.insert("threshold".to_string(), format!("{:.0}%", threshold));
        self.dispatch(key, device, details, now)
    }

    /// Sustained high memory usage
    pub fn high_memory(
        &mut self,
        device: &DeviceRef,
        memory_percent: f64,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> bool {
        let key = AlertKey::device(AlertKind::HighMemory, device.id);
        let mut details = self.base_details(device, now);
        details.insert(
            "memory_usage".to_string(),
            format!("{:.1}%", memory_percent),
        );
        details.insert("threshold".to_string(), format!("{:.0}%", threshold));
        self.dispatch(key, device, details, now)
    }

    /// Interface link went down
    pub fn interface_down(
        &mut self,
        device: &DeviceRef,
        iface: &InterfaceRecord,
        now: DateTime<Utc>,
    ) -> bool {
        let key = AlertKey::interface(AlertKind::InterfaceDown, device.id, &iface.name);
        let mut details = self.base_details(device, now);
        details.insert("interface".to_string(), iface.name.clone());
        if !iface.kind.is_empty() {
            details.insert("type".to_string(), iface.kind.clone());
        }
        if let Some(mac) = &iface.mac_address {
            details.insert("mac_address".to_string(), mac.clone());
        }
        self.dispatch(key, device, details, now)
    }

    /// Sustained high bandwidth usage, with optional trend detail
    #[allow(clippy::too_many_arguments)]
    pub fn high_bandwidth(
        &mut self,
        device: &DeviceRef,
        interface: &str,
        usage_bits: u64,
        capacity_bits: u64,
        threshold: f64,
        trend: Option<&TrendSummary>,
        now: DateTime<Utc>,
    ) -> bool {
        let key = AlertKey::interface(AlertKind::HighBandwidth, device.id, interface);
        let usage_percent = (usage_bits as f64 / capacity_bits as f64) * 100.0;

        let mut details = self.base_details(device, now);
        details.insert("interface".to_string(), interface.to_string());
        details.insert("current_usage".to_string(), format_bits(usage_bits as f64));
        details.insert("max_speed".to_string(), format_bits(capacity_bits as f64));
        details.insert("usage_percent".to_string(), format!("{:.1}%", usage_percent));
        details.insert("threshold".to_string(), format!("{:.0}%", threshold));
        if let Some(summary) = trend {
            details.insert("trend".to_string(), summary.trend.to_string());
            details.insert(
                "avg_rx_change".to_string(),
                format!("{}/s", format_bits(summary.avg_rx_change)),
            );
            details.insert(
                "avg_tx_change".to_string(),
                format!("{}/s", format_bits(summary.avg_tx_change)),
            );
        }
        self.dispatch(key, device, details, now)
    }

    /// Wireless signal at or below the interference threshold
    pub fn wireless_interference(
        &mut self,
        device: &DeviceRef,
        interface: &str,
        signal_dbm: i32,
        threshold_dbm: i32,
        now: DateTime<Utc>,
    ) -> bool {
        let key = AlertKey::interface(AlertKind::WirelessInterference, device.id, interface);
        let mut details = self.base_details(device, now);
        details.insert("interface".to_string(), interface.to_string());
        details.insert("signal_strength".to_string(), format!("{} dBm", signal_dbm));
        details.insert("threshold".to_string(), format!("{} dBm", threshold_dbm));
        self.dispatch(key, device, details, now)
    }

    fn base_details(&self, device: &DeviceRef, now: DateTime<Utc>) -> BTreeMap<String, String> {
        let mut details = BTreeMap::new();
        details.insert("device_id".to_string(), device.id.to_string());
        details.insert(
            "timestamp".to_string(),
            now.format(TIMESTAMP_FORMAT).to_string(),
        );
        details
    }

    /// Gate and send; returns whether a delivery attempt was made
    fn dispatch(
        &mut self,
        key: AlertKey,
        device: &DeviceRef,
        details: BTreeMap<String, String>,
        now: DateTime<Utc>,
    ) -> bool {
        if !self.config.is_enabled(key.kind) {
            return false;
        }

        let cooldown = self.config.cooldown(key.kind);
        if !self.gate.can_send(&key, cooldown, now) {
            log::debug!("Alert {} suppressed by cooldown", key);
            return false;
        }

        let event = AlertEvent {
            device_name: device.display_name(),
            kind: key.kind,
            message: key.kind.headline().to_string(),
            details,
        };

        log::warn!("Alert {}: {} on {}", key, event.message, event.device_name);

        match self.sink.send_alert(&event) {
            Ok(report) => {
                for (recipient, status) in &report {
                    if let crate::notify::DeliveryStatus::Failed(reason) = status {
                        log::error!("Delivery to {} failed for {}: {}", recipient, key, reason);
                    }
                }
            }
            Err(e) => {
                log::error!("Sink rejected alert {}: {}", key, e);
            }
        }
        true
    }
}
