//! Domain models for device monitoring
//!
//! Value types for telemetry readings plus the in-memory state the poll
//! loop maintains per device and per interface.

pub mod bandwidth;
pub mod capacity;
pub mod device;
pub mod status;

pub use bandwidth::{format_bits, BandwidthHistory, BandwidthSample, Trend, TrendSummary};
pub use capacity::CapacityResolver;
pub use device::{DeviceId, DeviceRef, InterfaceRecord, ResourceSnapshot, TrafficReading};
pub use status::{DeviceStatus, DeviceStatusTracker, InterfaceState, LinkEdge};
