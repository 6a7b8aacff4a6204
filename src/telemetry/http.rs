//! Blocking HTTP telemetry client
//!
//! Talks to the management API that fronts the monitored devices. All the
//! wire-shape quirks are normalized here so the rest of the engine only
//! ever sees the canonical domain types.

use crate::domain::device::parse_cpu_load;
use crate::domain::{DeviceId, DeviceRef, InterfaceRecord, ResourceSnapshot, TrafficReading};
use crate::error::TelemetryError;
use crate::telemetry::TelemetryClient;

use serde::Deserialize;
use std::time::Duration;

/// HTTP implementation of the telemetry source
pub struct HttpTelemetry {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpTelemetry {
    /// Create a client against the given API base URL with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TelemetryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TelemetryError::from_reqwest)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, TelemetryError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(TelemetryError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::Status(status.as_u16()));
        }

        response.json().map_err(TelemetryError::from_reqwest)
    }
}

/// Wire shape for the connectivity endpoint
#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    connected: bool,
}

/// Wire shape for the resources endpoint
///
/// Two memory field spellings appear in the wild: used/total and
/// total/free. Both deserialize here; [`ResourcesBody::normalize`] folds
/// them into the canonical used/total pair (used = total - free when only
/// the second form is present). Missing fields default to zero, which
/// downstream checks treat as "skip".
#[derive(Debug, Deserialize)]
struct ResourcesBody {
    #[serde(default, rename = "cpuLoad")]
    cpu_load: serde_json::Value,
    #[serde(default, rename = "memoryUsed")]
    memory_used: Option<u64>,
    #[serde(default, rename = "memoryTotal")]
    memory_total: Option<u64>,
    #[serde(default, rename = "totalMemory")]
    total_memory: Option<u64>,
    #[serde(default, rename = "freeMemory")]
    free_memory: Option<u64>,
}

impl ResourcesBody {
    fn normalize(self) -> ResourceSnapshot {
        let (memory_used, memory_total) = match (self.memory_used, self.memory_total) {
            (Some(used), Some(total)) => (used, total),
            _ => match (self.total_memory, self.free_memory) {
                (Some(total), Some(free)) => (total.saturating_sub(free), total),
                _ => (0, 0),
            },
        };

        ResourceSnapshot {
            cpu_load: parse_cpu_load(&self.cpu_load),
            memory_used,
            memory_total,
        }
    }
}

impl TelemetryClient for HttpTelemetry {
    fn list_devices(&self) -> Result<Vec<DeviceRef>, TelemetryError> {
        self.get_json("/connections")
    }

    fn device_status(&self, device: DeviceId) -> Result<bool, TelemetryError> {
        let body: StatusBody = self.get_json(&format!("/connections/{}/status", device))?;
        Ok(body.connected)
    }

    fn device_resources(&self, device: DeviceId) -> Result<ResourceSnapshot, TelemetryError> {
        let body: ResourcesBody = self.get_json(&format!("/routers/{}/resources", device))?;
        Ok(body.normalize())
    }

    fn device_interfaces(&self, device: DeviceId) -> Result<Vec<InterfaceRecord>, TelemetryError> {
        self.get_json(&format!("/routers/{}/interfaces", device))
    }

    fn interface_traffic(
        &self,
        device: DeviceId,
        interface: &str,
    ) -> Result<TrafficReading, TelemetryError> {
        self.get_json(&format!(
            "/routers/{}/interface-traffic?interface={}",
            device, interface
        ))
    }
}
