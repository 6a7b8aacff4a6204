//! Link capacity resolution
//!
//! Bandwidth usage percent needs a denominator. Capacity is resolved once
//! per (device, interface) key and cached for the process lifetime: an
//! explicit speed attribute wins, otherwise a heuristic keyed on the
//! interface type string supplies an estimate.

use crate::domain::device::{DeviceId, InterfaceRecord};
use std::collections::HashMap;

/// Resolves and caches interface link capacity in bits per second
#[derive(Debug, Default)]
pub struct CapacityResolver {
    cache: HashMap<(DeviceId, String), Option<u64>>,
}

impl CapacityResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve capacity for an interface, consulting the cache first
    ///
    /// Returns `None` when neither a speed attribute nor a type string is
    /// available; callers skip the threshold check for that interface but
    /// keep sampling. Negative results are cached too.
    pub fn resolve(&mut self, device: DeviceId, iface: &InterfaceRecord) -> Option<u64> {
        let key = (device, iface.name.clone());
        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let resolved = iface
            .speed
            .as_deref()
            .and_then(parse_speed)
            .or_else(|| iface.max_speed.as_deref().and_then(parse_speed))
            .or_else(|| {
                if iface.kind.is_empty() {
                    None
                } else {
                    Some(estimate_from_type(&iface.kind))
                }
            });

        self.cache.insert(key, resolved);
        resolved
    }

    /// Number of cached resolutions
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

/// Parse a speed string like "1Gbps", "100Mbps", or "10Kbps" into bits/s
///
/// Case-insensitive, accepts decimals and the "b/s" spelling, and falls
/// back to reading a bare number as bits per second.
pub fn parse_speed(raw: &str) -> Option<u64> {
    let s = raw.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }

    let scaled = |suffixes: &[&str], factor: f64| -> Option<u64> {
        for suffix in suffixes {
            if let Some(num) = s.strip_suffix(suffix) {
                return num.trim().parse::<f64>().ok().map(|n| (n * factor) as u64);
            }
        }
        None
    };

    scaled(&["gbps", "gb/s"], 1e9)
        .or_else(|| scaled(&["mbps", "mb/s"], 1e6))
        .or_else(|| scaled(&["kbps", "kb/s"], 1e3))
        .or_else(|| s.parse::<f64>().ok().map(|n| n as u64))
}

/// Estimate capacity from an interface type string
///
/// Substring matches, checked most-specific first; anything unrecognized
/// gets the 100 Mbps default.
pub fn estimate_from_type(kind: &str) -> u64 {
    let kind = kind.to_lowercase();

    if kind.contains("10gbe") || kind.contains("10g") {
        10_000_000_000
    } else if kind.contains("giga") {
        1_000_000_000
    } else if kind.contains("fast") {
        100_000_000
    } else if kind.contains("ethernet") || kind.contains("ether") {
        1_000_000_000
    } else if kind.contains("wifi") || kind.contains("wireless") {
        300_000_000
    } else if kind.contains("pppoe") || kind.contains("ppp") {
        100_000_000
    } else {
        100_000_000
    }
}
