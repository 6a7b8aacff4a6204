//! Trait definition for the telemetry source
//!
//! Abstracts the device-telemetry API to enable testing with mocks.

use crate::domain::{DeviceId, DeviceRef, InterfaceRecord, ResourceSnapshot, TrafficReading};
use crate::error::TelemetryError;

/// Read-only client for device telemetry
///
/// All calls are blocking with the client's configured timeout. Every
/// failure maps to the closed [`TelemetryError`] set; the caller decides
/// what to skip.
pub trait TelemetryClient: Send + Sync {
    /// List all configured devices
    fn list_devices(&self) -> Result<Vec<DeviceRef>, TelemetryError>;

    /// Whether a device currently answers its management connection
    fn device_status(&self, device: DeviceId) -> Result<bool, TelemetryError>;

    /// Current resource snapshot for a device
    ///
    /// The implementation normalizes whatever memory field shape the wire
    /// uses into the canonical used/total pair.
    fn device_resources(&self, device: DeviceId) -> Result<ResourceSnapshot, TelemetryError>;

    /// All interfaces on a device
    fn device_interfaces(&self, device: DeviceId) -> Result<Vec<InterfaceRecord>, TelemetryError>;

    /// Live traffic rates for one interface
    fn interface_traffic(
        &self,
        device: DeviceId,
        interface: &str,
    ) -> Result<TrafficReading, TelemetryError>;
}

impl<T: TelemetryClient + ?Sized> TelemetryClient for std::sync::Arc<T> {
    fn list_devices(&self) -> Result<Vec<DeviceRef>, TelemetryError> {
        (**self).list_devices()
    }

    fn device_status(&self, device: DeviceId) -> Result<bool, TelemetryError> {
        (**self).device_status(device)
    }

    fn device_resources(&self, device: DeviceId) -> Result<ResourceSnapshot, TelemetryError> {
        (**self).device_resources(device)
    }

    fn device_interfaces(&self, device: DeviceId) -> Result<Vec<InterfaceRecord>, TelemetryError> {
        (**self).device_interfaces(device)
    }

    fn interface_traffic(
        &self,
        device: DeviceId,
        interface: &str,
    ) -> Result<TrafficReading, TelemetryError> {
        (**self).interface_traffic(device, interface)
    }
}
