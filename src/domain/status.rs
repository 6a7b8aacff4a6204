//! Per-device and per-interface state memory
//!
//! The tracker is written by exactly one evaluator path per tick (the poll
//! loop is sequential), so plain maps without locking are enough. Entries
//! are created on first sighting and never reaped; stale entries for
//! removed devices are harmless and persist for the process lifetime.

use crate::domain::device::{DeviceId, ResourceSnapshot};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Link-state memory for one interface
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceState {
    /// Last observed running flag
    pub running: bool,
    /// When the flag last changed (or was first observed)
    pub last_change: DateTime<Utc>,
}

/// Outcome of recording an interface observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEdge {
    /// First sighting of this interface name; recorded silently
    FirstSeen,
    /// No change since last tick
    Unchanged,
    /// Transition up -> down; alert candidate
    WentDown,
    /// Transition down -> up; re-arms the down alert
    CameUp,
}

/// Tracked state for one monitored device
#[derive(Debug, Clone)]
pub struct DeviceStatus {
    /// Last observed connectivity
    pub connected: bool,
    /// Consecutive polls that observed the device disconnected
    pub consecutive_failures: u32,
    /// When connectivity last flipped
    pub last_status_change: DateTime<Utc>,
    /// Most recent resource snapshot, if any fetch has succeeded
    pub latest_resources: Option<ResourceSnapshot>,
    /// Per-interface link-state memory
    pub interfaces: HashMap<String, InterfaceState>,
}

impl DeviceStatus {
    fn new(connected: bool, now: DateTime<Utc>) -> Self {
        Self {
            connected,
            // A device that is down from the very first poll still counts
            // that poll toward the retry budget.
            consecutive_failures: u32::from(!connected),
            last_status_change: now,
            latest_resources: None,
            interfaces: HashMap::new(),
        }
    }
}

/// Connectivity and link-state memory across all known devices
#[derive(Debug, Default)]
pub struct DeviceStatusTracker {
    devices: HashMap<DeviceId, DeviceStatus>,
}

impl DeviceStatusTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connectivity observation for a device
    ///
    /// Returns the consecutive-failure count after this observation (0 when
    /// connected). Each disconnected poll increments the counter; any
    /// connected poll resets it.
    pub fn record_connectivity(
        &mut self,
        device: DeviceId,
        connected: bool,
        now: DateTime<Utc>,
    ) -> u32 {
        let is_new = !self.devices.contains_key(&device);
        let entry = self
            .devices
            .entry(device)
            .or_insert_with(|| DeviceStatus::new(connected, now));

        // DeviceStatus::new already counted the first sighting
        if is_new {
            return entry.consecutive_failures;
        }

        if entry.connected != connected {
            entry.connected = connected;
            entry.last_status_change = now;
        }

        if connected {
            entry.consecutive_failures = 0;
        } else {
            entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
        }

        entry.consecutive_failures
    }

    /// Whether the device's tracked connectivity flag is up
    pub fn is_connected(&self, device: DeviceId) -> bool {
        self.devices.get(&device).map_or(false, |s| s.connected)
    }

    /// Store the latest resource snapshot for a device
    pub fn record_resources(&mut self, device: DeviceId, snapshot: ResourceSnapshot) {
        if let Some(status) = self.devices.get_mut(&device) {
            status.latest_resources = Some(snapshot);
        }
    }

    /// Record an interface link-state observation and classify the edge
    pub fn record_interface(
        &mut self,
        device: DeviceId,
        name: &str,
        running: bool,
        now: DateTime<Utc>,
    ) -> LinkEdge {
        let Some(status) = self.devices.get_mut(&device) else {
            return LinkEdge::FirstSeen;
        };

        match status.interfaces.get_mut(name) {
            None => {
                status.interfaces.insert(
                    name.to_string(),
                    InterfaceState {
                        running,
                        last_change: now,
                    },
                );
                LinkEdge::FirstSeen
            }
            Some(state) if state.running == running => LinkEdge::Unchanged,
            Some(state) => {
                state.running = running;
                state.last_change = now;
                if running {
                    LinkEdge::CameUp
                } else {
                    LinkEdge::WentDown
                }
            }
        }
    }

    /// Look up the tracked state for a device
    pub fn get(&self, device: DeviceId) -> Option<&DeviceStatus> {
        self.devices.get(&device)
    }

    /// Number of devices ever sighted
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Ids of all devices ever sighted, ascending
    pub fn device_ids(&self) -> Vec<DeviceId> {
        let mut ids: Vec<DeviceId> = self.devices.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
