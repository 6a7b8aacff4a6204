//! Bandwidth sample history and trend analysis
//!
//! Each monitored interface gets a fixed-capacity FIFO of traffic samples.
//! The history only feeds trend classification on bandwidth alerts; it is
//! never persisted and never gates whether an alert fires.

use crate::domain::device::{DeviceId, TrafficReading};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Samples kept per interface before the oldest is evicted
pub const HISTORY_CAPACITY: usize = 60;

/// Samples required before a trend can be classified
const TREND_WINDOW: usize = 5;

/// One traffic observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandwidthSample {
    /// When the sample was taken
    pub at: DateTime<Utc>,
    /// Receive rate in bits per second
    pub rx_bits_per_second: u64,
    /// Transmit rate in bits per second
    pub tx_bits_per_second: u64,
}

/// Overall direction of recent traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// Both directions growing
    Increasing,
    /// Both directions shrinking
    Decreasing,
    /// Only receive growing
    DownloadIncreasing,
    /// Only transmit growing
    UploadIncreasing,
    /// No consistent movement
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increasing => write!(f, "increasing"),
            Self::Decreasing => write!(f, "decreasing"),
            Self::DownloadIncreasing => write!(f, "download increasing"),
            Self::UploadIncreasing => write!(f, "upload increasing"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

/// Trend classification plus the average deltas behind it
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSummary {
    /// Classified direction
    pub trend: Trend,
    /// Average rx change per sample, bits per second
    pub avg_rx_change: f64,
    /// Average tx change per sample, bits per second
    pub avg_tx_change: f64,
}

/// Per-interface traffic sample rings across all devices
#[derive(Debug, Default)]
pub struct BandwidthHistory {
    rings: HashMap<(DeviceId, String), VecDeque<BandwidthSample>>,
}

impl BandwidthHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample for an interface, evicting the oldest past capacity
    pub fn push(
        &mut self,
        device: DeviceId,
        interface: &str,
        reading: TrafficReading,
        now: DateTime<Utc>,
    ) {
        let ring = self
            .rings
            .entry((device, interface.to_string()))
            .or_default();

        if ring.len() >= HISTORY_CAPACITY {
            ring.pop_front();
        }

        ring.push_back(BandwidthSample {
            at: now,
            rx_bits_per_second: reading.rx_bits_per_second,
            tx_bits_per_second: reading.tx_bits_per_second,
        });
    }

    /// Number of samples held for an interface
    pub fn len(&self, device: DeviceId, interface: &str) -> usize {
        self.rings
            .get(&(device, interface.to_string()))
            .map_or(0, VecDeque::len)
    }

    /// Whether no samples exist for an interface
    pub fn is_empty(&self, device: DeviceId, interface: &str) -> bool {
        self.len(device, interface) == 0
    }

    /// Classify the trend over the last five samples
    ///
    /// Returns `None` ("no trend") while fewer than five samples exist.
    /// Consecutive deltas for rx and tx are averaged; the sign pattern of
    /// the two averages picks the classification.
    pub fn analyze_trend(&self, device: DeviceId, interface: &str) -> Option<TrendSummary> {
        let ring = self.rings.get(&(device, interface.to_string()))?;
        if ring.len() < TREND_WINDOW {
            return None;
        }

        let recent: Vec<&BandwidthSample> = ring.iter().rev().take(TREND_WINDOW).rev().collect();

        let mut rx_deltas = Vec::with_capacity(TREND_WINDOW - 1);
        let mut tx_deltas = Vec::with_capacity(TREND_WINDOW - 1);
        for pair in recent.windows(2) {
            rx_deltas
                .push(pair[1].rx_bits_per_second as f64 - pair[0].rx_bits_per_second as f64);
            tx_deltas
                .push(pair[1].tx_bits_per_second as f64 - pair[0].tx_bits_per_second as f64);
        }

        let avg_rx = rx_deltas.iter().sum::<f64>() / rx_deltas.len() as f64;
        let avg_tx = tx_deltas.iter().sum::<f64>() / tx_deltas.len() as f64;

        let trend = if avg_rx > 0.0 && avg_tx > 0.0 {
            Trend::Increasing
        } else if avg_rx < 0.0 && avg_tx < 0.0 {
            Trend::Decreasing
        } else if avg_rx > 0.0 {
            Trend::DownloadIncreasing
        } else if avg_tx > 0.0 {
            Trend::UploadIncreasing
        } else {
            Trend::Stable
        };

        Some(TrendSummary {
            trend,
            avg_rx_change: avg_rx,
            avg_tx_change: avg_tx,
        })
    }
}

/// Format a bit rate as a human-readable string (bps through Tbps)
pub fn format_bits(bits: f64) -> String {
    if bits == 0.0 {
        return "0 bps".to_string();
    }

    const UNITS: [&str; 5] = ["bps", "Kbps", "Mbps", "Gbps", "Tbps"];
    let magnitude = bits.abs().log(1000.0).floor() as usize;
    let idx = magnitude.min(UNITS.len() - 1);
    let value = bits / 1000f64.powi(idx as i32);
    format!("{:.2} {}", value, UNITS[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};

    fn reading(rx: u64, tx: u64) -> TrafficReading {
        TrafficReading {
            rx_bits_per_second: rx,
            tx_bits_per_second: tx,
        }
    }

    fn fill(history: &mut BandwidthHistory, clock: &ManualClock, samples: &[(u64, u64)]) {
        for &(rx, tx) in samples {
            history.push(1, "ether1", reading(rx, tx), clock.now());
            clock.advance_secs(60);
        }
    }

    #[test]
    fn test_ring_evicts_oldest_at_capacity() {
        let clock = ManualClock::at_epoch();
        let mut history = BandwidthHistory::new();

        for i in 0..(HISTORY_CAPACITY as u64 + 10) {
            history.push(1, "ether1", reading(i, i), clock.now());
            clock.advance_secs(60);
        }

        assert_eq!(history.len(1, "ether1"), HISTORY_CAPACITY);
        // The ten oldest samples are gone; the newest survive
        let ring = history.rings.get(&(1, "ether1".to_string())).unwrap();
        assert_eq!(ring.front().unwrap().rx_bits_per_second, 10);
        assert_eq!(
            ring.back().unwrap().rx_bits_per_second,
            HISTORY_CAPACITY as u64 + 9
        );
    }

    #[test]
    fn test_no_trend_under_five_samples() {
        let clock = ManualClock::at_epoch();
        let mut history = BandwidthHistory::new();
        fill(&mut history, &clock, &[(10, 10), (20, 20), (30, 30), (40, 40)]);
        assert!(history.analyze_trend(1, "ether1").is_none());
    }

    #[test]
    fn test_trend_increasing() {
        let clock = ManualClock::at_epoch();
        let mut history = BandwidthHistory::new();
        fill(
            &mut history,
            &clock,
            &[(10, 10), (20, 20), (30, 30), (40, 40), (50, 50)],
        );

        let summary = history.analyze_trend(1, "ether1").unwrap();
        assert_eq!(summary.trend, Trend::Increasing);
        assert_eq!(summary.avg_rx_change, 10.0);
        assert_eq!(summary.avg_tx_change, 10.0);
    }

    #[test]
    fn test_trend_decreasing() {
        let clock = ManualClock::at_epoch();
        let mut history = BandwidthHistory::new();
        fill(
            &mut history,
            &clock,
            &[(50, 50), (40, 40), (30, 30), (20, 20), (10, 10)],
        );
        assert_eq!(
            history.analyze_trend(1, "ether1").unwrap().trend,
            Trend::Decreasing
        );
    }

    #[test]
    fn test_trend_download_increasing() {
        let clock = ManualClock::at_epoch();
        let mut history = BandwidthHistory::new();
        fill(
            &mut history,
            &clock,
            &[(10, 50), (20, 50), (30, 50), (40, 50), (50, 50)],
        );
        assert_eq!(
            history.analyze_trend(1, "ether1").unwrap().trend,
            Trend::DownloadIncreasing
        );
    }

    #[test]
    fn test_trend_upload_increasing() {
        let clock = ManualClock::at_epoch();
        let mut history = BandwidthHistory::new();
        fill(
            &mut history,
            &clock,
            &[(50, 10), (50, 20), (50, 30), (50, 40), (50, 50)],
        );
        assert_eq!(
            history.analyze_trend(1, "ether1").unwrap().trend,
            Trend::UploadIncreasing
        );
    }

    #[test]
    fn test_trend_stable() {
        let clock = ManualClock::at_epoch();
        let mut history = BandwidthHistory::new();
        fill(
            &mut history,
            &clock,
            &[(50, 50), (50, 50), (50, 50), (50, 50), (50, 50)],
        );
        assert_eq!(
            history.analyze_trend(1, "ether1").unwrap().trend,
            Trend::Stable
        );
    }

    #[test]
    fn test_trend_uses_only_recent_window() {
        let clock = ManualClock::at_epoch();
        let mut history = BandwidthHistory::new();
        // Old decreasing run followed by a fresh increasing window
        fill(
            &mut history,
            &clock,
            &[
                (90, 90),
                (80, 80),
                (10, 10),
                (20, 20),
                (30, 30),
                (40, 40),
                (50, 50),
            ],
        );
        assert_eq!(
            history.analyze_trend(1, "ether1").unwrap().trend,
            Trend::Increasing
        );
    }

    #[test]
    fn test_histories_are_per_interface() {
        let clock = ManualClock::at_epoch();
        let mut history = BandwidthHistory::new();
        history.push(1, "ether1", reading(10, 10), clock.now());
        history.push(1, "ether2", reading(10, 10), clock.now());
        history.push(2, "ether1", reading(10, 10), clock.now());

        assert_eq!(history.len(1, "ether1"), 1);
        assert_eq!(history.len(1, "ether2"), 1);
        assert_eq!(history.len(2, "ether1"), 1);
        assert!(history.is_empty(3, "ether1"));
    }

    #[test]
    fn test_format_bits() {
        assert_eq!(format_bits(0.0), "0 bps");
        assert_eq!(format_bits(500.0), "500.00 bps");
        assert_eq!(format_bits(1_500.0), "1.50 Kbps");
        assert_eq!(format_bits(80_000_000.0), "80.00 Mbps");
        assert_eq!(format_bits(1_000_000_000.0), "1.00 Gbps");
    }
}
