//! Mock implementations for testing
//!
//! Scriptable telemetry source and recording notification sink, so the
//! poll loop and dispatcher can be exercised without a live API.

use crate::alerts::AlertEvent;
use crate::domain::{DeviceId, DeviceRef, InterfaceRecord, ResourceSnapshot, TrafficReading};
use crate::error::{Result, TelemetryError};
use crate::notify::{AlertSink, DeliveryReport, DeliveryStatus};
use crate::telemetry::TelemetryClient;

use std::collections::HashMap;
use std::sync::Mutex;

/// Scriptable in-memory telemetry source
#[derive(Debug, Default)]
pub struct MockTelemetry {
    devices: Mutex<Vec<DeviceRef>>,
    connected: Mutex<HashMap<DeviceId, bool>>,
    resources: Mutex<HashMap<DeviceId, ResourceSnapshot>>,
    interfaces: Mutex<HashMap<DeviceId, Vec<InterfaceRecord>>>,
    traffic: Mutex<HashMap<(DeviceId, String), TrafficReading>>,
    fail_listing: Mutex<bool>,
    fail_status: Mutex<HashMap<DeviceId, bool>>,
    fail_resources: Mutex<HashMap<DeviceId, bool>>,
}

impl MockTelemetry {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device, initially connected
    pub fn add_device(&self, id: DeviceId, name: &str) {
        self.devices.lock().unwrap().push(DeviceRef {
            id,
            name: name.to_string(),
        });
        self.connected.lock().unwrap().insert(id, true);
    }

    /// Set a device's connectivity
    pub fn set_connected(&self, id: DeviceId, connected: bool) {
        self.connected.lock().unwrap().insert(id, connected);
    }

    /// Set a device's resource snapshot
    pub fn set_resources(&self, id: DeviceId, cpu_load: f64, memory_used: u64, memory_total: u64) {
        self.resources.lock().unwrap().insert(
            id,
            ResourceSnapshot {
                cpu_load,
                memory_used,
                memory_total,
            },
        );
    }

    /// Replace a device's interface list
    pub fn set_interfaces(&self, id: DeviceId, interfaces: Vec<InterfaceRecord>) {
        self.interfaces.lock().unwrap().insert(id, interfaces);
    }

    /// Set the live traffic reading for one interface
    pub fn set_traffic(&self, id: DeviceId, interface: &str, rx: u64, tx: u64) {
        self.traffic.lock().unwrap().insert(
            (id, interface.to_string()),
            TrafficReading {
                rx_bits_per_second: rx,
                tx_bits_per_second: tx,
            },
        );
    }

    /// Make the next device listings fail as unreachable
    pub fn fail_device_list(&self, fail: bool) {
        *self.fail_listing.lock().unwrap() = fail;
    }

    /// Make status fetches for one device fail as timeouts
    pub fn fail_status_for(&self, id: DeviceId, fail: bool) {
        self.fail_status.lock().unwrap().insert(id, fail);
    }

    /// Make resource fetches for one device fail as timeouts
    pub fn fail_resources_for(&self, id: DeviceId, fail: bool) {
        self.fail_resources.lock().unwrap().insert(id, fail);
    }
}

impl TelemetryClient for MockTelemetry {
    fn list_devices(&self) -> std::result::Result<Vec<DeviceRef>, TelemetryError> {
        if *self.fail_listing.lock().unwrap() {
            return Err(TelemetryError::Unreachable("mock listing failure".into()));
        }
        Ok(self.devices.lock().unwrap().clone())
    }

    fn device_status(&self, device: DeviceId) -> std::result::Result<bool, TelemetryError> {
        if self
            .fail_status
            .lock()
            .unwrap()
            .get(&device)
            .copied()
            .unwrap_or(false)
        {
            return Err(TelemetryError::Timeout);
        }
        Ok(self
            .connected
            .lock()
            .unwrap()
            .get(&device)
            .copied()
            .unwrap_or(false))
    }

    fn device_resources(
        &self,
        device: DeviceId,
    ) -> std::result::Result<ResourceSnapshot, TelemetryError> {
        if self
            .fail_resources
            .lock()
            .unwrap()
            .get(&device)
            .copied()
            .unwrap_or(false)
        {
            return Err(TelemetryError::Timeout);
        }
        Ok(self
            .resources
            .lock()
            .unwrap()
            .get(&device)
            .copied()
            .unwrap_or_default())
    }

    fn device_interfaces(
        &self,
        device: DeviceId,
    ) -> std::result::Result<Vec<InterfaceRecord>, TelemetryError> {
        Ok(self
            .interfaces
            .lock()
            .unwrap()
            .get(&device)
            .cloned()
            .unwrap_or_default())
    }

    fn interface_traffic(
        &self,
        device: DeviceId,
        interface: &str,
    ) -> std::result::Result<TrafficReading, TelemetryError> {
        Ok(self
            .traffic
            .lock()
            .unwrap()
            .get(&(device, interface.to_string()))
            .copied()
            .unwrap_or_default())
    }
}

/// Recording notification sink
#[derive(Debug, Default)]
pub struct MockSink {
    events: Mutex<Vec<AlertEvent>>,
    fail_reason: Mutex<Option<String>>,
}

impl MockSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All delivery attempts so far, in order
    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Number of delivery attempts so far
    pub fn sent_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Make subsequent sends report failure with the given reason
    pub fn fail_next_sends(&self, reason: &str) {
        *self.fail_reason.lock().unwrap() = Some(reason.to_string());
    }
}

impl AlertSink for MockSink {
    fn send_alert(&self, event: &AlertEvent) -> Result<DeliveryReport> {
        self.events.lock().unwrap().push(event.clone());

        let status = match self.fail_reason.lock().unwrap().as_ref() {
            Some(reason) => DeliveryStatus::Failed(reason.clone()),
            None => DeliveryStatus::Sent,
        };

        let mut report = DeliveryReport::new();
        report.insert(self.name().to_string(), status);
        Ok(report)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_telemetry_devices() {
        let telemetry = MockTelemetry::new();
        telemetry.add_device(1, "Core Router");
        telemetry.add_device(2, "Branch Router");

        let devices = telemetry.list_devices().unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "Core Router");
        assert!(telemetry.device_status(1).unwrap());
    }

    #[test]
    fn test_mock_telemetry_connectivity_scripting() {
        let telemetry = MockTelemetry::new();
        telemetry.add_device(1, "r1");
        telemetry.set_connected(1, false);
        assert!(!telemetry.device_status(1).unwrap());
        // Unknown devices read as disconnected
        assert!(!telemetry.device_status(99).unwrap());
    }

    #[test]
    fn test_mock_telemetry_failure_injection() {
        let telemetry = MockTelemetry::new();
        telemetry.add_device(1, "r1");

        telemetry.fail_device_list(true);
        assert!(telemetry.list_devices().is_err());
        telemetry.fail_device_list(false);
        assert!(telemetry.list_devices().is_ok());

        telemetry.fail_resources_for(1, true);
        assert!(matches!(
            telemetry.device_resources(1),
            Err(TelemetryError::Timeout)
        ));

        telemetry.fail_status_for(1, true);
        assert!(telemetry.device_status(1).is_err());
        telemetry.fail_status_for(1, false);
        assert!(telemetry.device_status(1).is_ok());
    }

    #[test]
    fn test_mock_sink_records_events() {
        let sink = MockSink::new();
        let event = AlertEvent {
            device_name: "r1".to_string(),
            kind: crate::alerts::AlertKind::HighCpu,
            message: "High CPU load".to_string(),
            details: Default::default(),
        };

        let report = sink.send_alert(&event).unwrap();
        assert!(report["mock"].is_sent());
        assert_eq!(sink.sent_count(), 1);

        sink.fail_next_sends("down");
        let report = sink.send_alert(&event).unwrap();
        assert!(!report["mock"].is_sent());
        assert_eq!(sink.sent_count(), 2);
    }
}
