//! Poll cycle orchestrator
//!
//! One `tick` is a full sweep: list devices, then evaluate each one in
//! isolation. A telemetry failure for one device (or one interface) is
//! logged and skipped; it never aborts the rest of the sweep. Only a
//! failed device listing abandons a tick, since without it there is
//! nothing to sweep.
//!
//! Sweep order per device mirrors the severity ladder: connectivity
//! first (a disconnected device skips everything downstream), then
//! resources, then interfaces with link-state, wireless and bandwidth
//! checks.

use crate::alerts::{AlertDispatcher, AlertKey, AlertKind, ThresholdEvaluator, ThresholdState};
use crate::clock::Clock;
use crate::config::Config;
use crate::domain::{
    BandwidthHistory, CapacityResolver, DeviceRef, DeviceStatusTracker, InterfaceRecord, LinkEdge,
};
use crate::error::AppError;
use crate::notify::AlertSink;
use crate::telemetry::TelemetryClient;
use chrono::{DateTime, Utc};
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// The polling-evaluate-alert engine
pub struct Monitor<T: TelemetryClient> {
    config: Config,
    telemetry: T,
    clock: Arc<dyn Clock>,
    tracker: DeviceStatusTracker,
    thresholds: ThresholdEvaluator,
    history: BandwidthHistory,
    capacities: CapacityResolver,
    dispatcher: AlertDispatcher,
}

impl<T: TelemetryClient> Monitor<T> {
    /// Wire up a monitor over a telemetry client and an alert sink
    pub fn new(
        config: Config,
        telemetry: T,
        sink: Box<dyn AlertSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let dispatcher = AlertDispatcher::new(config.alerts.clone(), sink);
        Self {
            config,
            telemetry,
            clock,
            tracker: DeviceStatusTracker::new(),
            thresholds: ThresholdEvaluator::new(),
            history: BandwidthHistory::new(),
            capacities: CapacityResolver::new(),
            dispatcher,
        }
    }

    /// Seconds between sweeps, from configuration
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.config.general.check_interval_secs)
    }

    /// Run one full sweep over every known device
    ///
    /// Returns the number of devices evaluated. Fails only when the
    /// device listing itself cannot be fetched.
    pub fn tick(&mut self) -> Result<usize, AppError> {
        if !self.config.general.enabled {
            log::debug!("Monitoring disabled, skipping sweep");
            return Ok(0);
        }

        let devices = self.telemetry.list_devices().map_err(|e| {
            log::error!("Device listing failed, abandoning sweep: {}", e);
            AppError::Telemetry(e)
        })?;

        let now = self.clock.now();
        log::debug!("Sweeping {} devices", devices.len());

        for device in &devices {
            self.evaluate_device(device, now);
        }

        Ok(devices.len())
    }

    /// Sweep loop; returns when the stop channel fires or closes
    pub fn run(&mut self, stop: &Receiver<()>) {
        log::info!(
            "Monitor started, polling every {}s",
            self.config.general.check_interval_secs
        );

        loop {
            match stop.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            if let Err(e) = self.tick() {
                log::warn!("Sweep failed: {}", e);
            }

            match stop.recv_timeout(self.check_interval()) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }

        log::info!("Monitor stopped");
    }

    fn evaluate_device(&mut self, device: &DeviceRef, now: DateTime<Utc>) {
        let connected = match self.telemetry.device_status(device.id) {
            Ok(connected) => connected,
            Err(e) => {
                // Transport failure says nothing about the device itself:
                // skip this check without touching the failure counter
                log::warn!("Status fetch for {} failed: {}", device, e);
                return;
            }
        };

        let failures = self.tracker.record_connectivity(device.id, connected, now);
        if !connected {
            log::debug!("{} disconnected ({} consecutive)", device, failures);
            if failures >= self.config.alerts.connection_lost.retries {
                self.dispatcher.connection_lost(device, failures, now);
            }
            // No point polling resources on a dead device
            return;
        }

        self.check_resources(device, now);
        self.check_interfaces(device, now);
    }

    fn check_resources(&mut self, device: &DeviceRef, now: DateTime<Utc>) {
        let cpu_rule = &self.config.alerts.high_cpu;
        let mem_rule = &self.config.alerts.high_memory;
        if !cpu_rule.enabled && !mem_rule.enabled {
            return;
        }

        let snapshot = match self.telemetry.device_resources(device.id) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Resource fetch for {} failed: {}", device, e);
                return;
            }
        };
        self.tracker.record_resources(device.id, snapshot);

        if cpu_rule.enabled {
            let key = AlertKey::device(AlertKind::HighCpu, device.id);
            let state = self.thresholds.evaluate(
                &key,
                snapshot.cpu_load,
                cpu_rule.threshold,
                cpu_rule.sustain(),
                now,
            );
            if state == ThresholdState::Firing {
                self.dispatcher
                    .high_cpu(device, snapshot.cpu_load, cpu_rule.threshold, now);
            }
        }

        if mem_rule.enabled {
            // Unknown total memory: skip rather than divide by zero
            if let Some(percent) = snapshot.memory_percent() {
                let key = AlertKey::device(AlertKind::HighMemory, device.id);
                let state = self.thresholds.evaluate(
                    &key,
                    percent,
                    mem_rule.threshold,
                    mem_rule.sustain(),
                    now,
                );
                if state == ThresholdState::Firing {
                    self.dispatcher
                        .high_memory(device, percent, mem_rule.threshold, now);
                }
            }
        }
    }

    fn check_interfaces(&mut self, device: &DeviceRef, now: DateTime<Utc>) {
        let config = &self.config.alerts;
        if !config.interface_down.enabled
            && !config.high_bandwidth.enabled
            && !config.wireless_interference.enabled
        {
            return;
        }

        let interfaces = match self.telemetry.device_interfaces(device.id) {
            Ok(interfaces) => interfaces,
            Err(e) => {
                log::warn!("Interface fetch for {} failed: {}", device, e);
                return;
            }
        };

        for iface in &interfaces {
            if iface.disabled || self.config.alerts.interface_down.is_excluded(&iface.name) {
                continue;
            }

            let edge = self
                .tracker
                .record_interface(device.id, &iface.name, iface.running, now);
            if edge == LinkEdge::WentDown {
                self.dispatcher.interface_down(device, iface, now);
            }

            self.check_wireless(device, iface, now);
            self.check_bandwidth(device, iface, now);
        }
    }

    fn check_wireless(&mut self, device: &DeviceRef, iface: &InterfaceRecord, now: DateTime<Utc>) {
        let rule = &self.config.alerts.wireless_interference;
        if !rule.enabled || !iface.is_wireless() {
            return;
        }
        let Some(signal) = iface.signal_strength else {
            return;
        };
        if signal <= rule.signal_threshold {
            self.dispatcher
                .wireless_interference(device, &iface.name, signal, rule.signal_threshold, now);
        }
    }

    fn check_bandwidth(&mut self, device: &DeviceRef, iface: &InterfaceRecord, now: DateTime<Utc>) {
        let rule = self.config.alerts.high_bandwidth.clone();
        if !rule.enabled {
            return;
        }

        let reading = match self.telemetry.interface_traffic(device.id, &iface.name) {
            Ok(reading) => reading,
            Err(e) => {
                log::debug!("Traffic fetch for {} {} failed: {}", device, iface.name, e);
                return;
            }
        };

        // Sampling happens regardless of whether capacity is known, so
        // the trend window is warm once the speed becomes resolvable.
        self.history.push(device.id, &iface.name, reading, now);

        let Some(capacity) = self.capacities.resolve(device.id, iface) else {
            log::debug!("No capacity known for {} {}", device, iface.name);
            return;
        };
        if capacity == 0 {
            return;
        }

        let usage = reading.peak();
        let usage_percent = (usage as f64 / capacity as f64) * 100.0;

        let key = AlertKey::interface(AlertKind::HighBandwidth, device.id, &iface.name);
        let state = self
            .thresholds
            .evaluate(&key, usage_percent, rule.threshold, rule.sustain(), now);
        if state == ThresholdState::Firing {
            let trend = self.history.analyze_trend(device.id, &iface.name);
            self.dispatcher.high_bandwidth(
                device,
                &iface.name,
                usage,
                capacity,
                rule.threshold,
                trend.as_ref(),
                now,
            );
        }
    }

    /// The tracker, for status reporting
    pub fn tracker(&self) -> &DeviceStatusTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::mock::{MockSink, MockTelemetry};

    fn setup(config: Config) -> (Monitor<Arc<MockTelemetry>>, Arc<MockTelemetry>, Arc<MockSink>, Arc<ManualClock>) {
        let telemetry = Arc::new(MockTelemetry::new());
        let sink = Arc::new(MockSink::new());
        let clock = Arc::new(ManualClock::at_epoch());
        let monitor = Monitor::new(
            config,
            Arc::clone(&telemetry),
            Box::new(Arc::clone(&sink)),
            clock.clone() as Arc<dyn Clock>,
        );
        (monitor, telemetry, sink, clock)
    }

    fn kinds(sink: &MockSink) -> Vec<AlertKind> {
        sink.events().iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_disabled_master_switch_skips_sweep() {
        let mut config = Config::default();
        config.general.enabled = false;
        let (mut monitor, telemetry, sink, _clock) = setup(config);
        telemetry.add_device(1, "r1");
        telemetry.set_connected(1, false);

        assert_eq!(monitor.tick().unwrap(), 0);
        assert_eq!(sink.sent_count(), 0);
    }

    #[test]
    fn test_listing_failure_abandons_tick() {
        let (mut monitor, telemetry, sink, _clock) = setup(Config::default());
        telemetry.add_device(1, "r1");
        telemetry.fail_device_list(true);

        assert!(monitor.tick().is_err());
        assert_eq!(sink.sent_count(), 0);

        telemetry.fail_device_list(false);
        assert_eq!(monitor.tick().unwrap(), 1);
    }

    #[test]
    fn test_connection_lost_after_retry_budget() {
        let (mut monitor, telemetry, sink, clock) = setup(Config::default());
        telemetry.add_device(1, "r1");
        telemetry.set_connected(1, false);

        // Default retries is 3: polls 1 and 2 stay quiet
        monitor.tick().unwrap();
        clock.advance_secs(60);
        monitor.tick().unwrap();
        assert_eq!(sink.sent_count(), 0);

        clock.advance_secs(60);
        monitor.tick().unwrap();
        assert_eq!(kinds(&sink), vec![AlertKind::ConnectionLost]);
    }

    #[test]
    fn test_reconnect_resets_retry_budget() {
        let (mut monitor, telemetry, sink, clock) = setup(Config::default());
        telemetry.add_device(1, "r1");
        telemetry.set_connected(1, false);

        monitor.tick().unwrap();
        clock.advance_secs(60);
        monitor.tick().unwrap();

        telemetry.set_connected(1, true);
        clock.advance_secs(60);
        monitor.tick().unwrap();

        telemetry.set_connected(1, false);
        clock.advance_secs(60);
        monitor.tick().unwrap();
        clock.advance_secs(60);
        monitor.tick().unwrap();
        // Two failures since the reconnect: still under budget
        assert_eq!(sink.sent_count(), 0);
    }

    #[test]
    fn test_disconnected_device_skips_resource_checks() {
        let (mut monitor, telemetry, sink, clock) = setup(Config::default());
        telemetry.add_device(1, "r1");
        telemetry.set_connected(1, false);
        telemetry.set_resources(1, 99.0, 990, 1000);

        // Sweep well past any sustain window; only the connection alert fires
        for _ in 0..10 {
            monitor.tick().unwrap();
            clock.advance_secs(60);
        }
        assert!(kinds(&sink).iter().all(|k| *k == AlertKind::ConnectionLost));
    }

    #[test]
    fn test_cpu_alert_lifecycle() {
        // Threshold 80, sustain 300s, cooldown 3600s, polled every 60s
        let (mut monitor, telemetry, sink, clock) = setup(Config::default());
        telemetry.add_device(1, "r1");
        telemetry.set_resources(1, 85.0, 100, 1000);

        // t=0..240: over threshold but not yet sustained
        for _ in 0..5 {
            monitor.tick().unwrap();
            assert_eq!(sink.sent_count(), 0);
            clock.advance_secs(60);
        }

        // t=300: sustained, fires once
        monitor.tick().unwrap();
        assert_eq!(kinds(&sink), vec![AlertKind::HighCpu]);

        // Still over threshold: cooldown suppresses repeats
        for _ in 0..10 {
            clock.advance_secs(60);
            monitor.tick().unwrap();
        }
        assert_eq!(sink.sent_count(), 1);

        // t=3900 (> 300 + 3600): cooldown elapsed, fires again
        clock.set(chrono::DateTime::from_timestamp(3900, 0).unwrap());
        monitor.tick().unwrap();
        assert_eq!(sink.sent_count(), 2);
    }

    #[test]
    fn test_cpu_dip_resets_sustain() {
        let (mut monitor, telemetry, sink, clock) = setup(Config::default());
        telemetry.add_device(1, "r1");
        telemetry.set_resources(1, 85.0, 100, 1000);

        for _ in 0..4 {
            monitor.tick().unwrap();
            clock.advance_secs(60);
        }

        // Dip below threshold at t=240
        telemetry.set_resources(1, 50.0, 100, 1000);
        monitor.tick().unwrap();
        clock.advance_secs(60);

        // Back over: the sustain clock starts fresh at t=300
        telemetry.set_resources(1, 85.0, 100, 1000);
        for _ in 0..5 {
            monitor.tick().unwrap();
            clock.advance_secs(60);
        }
        assert_eq!(sink.sent_count(), 0);

        monitor.tick().unwrap();
        assert_eq!(kinds(&sink), vec![AlertKind::HighCpu]);
    }

    #[test]
    fn test_memory_alert_from_used_total() {
        let mut config = Config::default();
        config.alerts.high_memory.duration_secs = 0;
        let (mut monitor, telemetry, sink, _clock) = setup(config);
        telemetry.add_device(1, "r1");
        // 90% memory, CPU idle
        telemetry.set_resources(1, 5.0, 900, 1000);

        monitor.tick().unwrap();
        assert_eq!(kinds(&sink), vec![AlertKind::HighMemory]);
        assert_eq!(sink.events()[0].details["memory_usage"], "90.0%");
    }

    #[test]
    fn test_zero_total_memory_never_alerts() {
        let mut config = Config::default();
        config.alerts.high_memory.duration_secs = 0;
        let (mut monitor, telemetry, sink, _clock) = setup(config);
        telemetry.add_device(1, "r1");
        telemetry.set_resources(1, 5.0, 900, 0);

        monitor.tick().unwrap();
        assert_eq!(sink.sent_count(), 0);
    }

    #[test]
    fn test_resource_failure_isolated_from_interfaces() {
        let mut config = Config::default();
        config.alerts.interface_down.cooldown_secs = 0;
        let (mut monitor, telemetry, sink, clock) = setup(config);
        telemetry.add_device(1, "r1");
        telemetry.fail_resources_for(1, true);
        telemetry.set_interfaces(1, vec![InterfaceRecord::new("ether1", true)]);

        monitor.tick().unwrap();

        // Resources keep failing; the link-down edge is still seen
        telemetry.set_interfaces(1, vec![InterfaceRecord::new("ether1", false)]);
        clock.advance_secs(60);
        monitor.tick().unwrap();
        assert_eq!(kinds(&sink), vec![AlertKind::InterfaceDown]);
    }

    #[test]
    fn test_device_failure_isolated_from_other_devices() {
        let mut config = Config::default();
        config.alerts.high_cpu.duration_secs = 0;
        let (mut monitor, telemetry, sink, _clock) = setup(config);
        telemetry.add_device(1, "broken");
        telemetry.add_device(2, "healthy");
        telemetry.fail_resources_for(1, true);
        telemetry.set_resources(2, 95.0, 100, 1000);

        assert_eq!(monitor.tick().unwrap(), 2);
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].device_name, "healthy");
    }

    #[test]
    fn test_interface_down_edge_not_level() {
        let (mut monitor, telemetry, sink, clock) = setup(Config::default());
        telemetry.add_device(1, "r1");
        telemetry.set_interfaces(1, vec![InterfaceRecord::new("ether1", true)]);
        monitor.tick().unwrap();

        telemetry.set_interfaces(1, vec![InterfaceRecord::new("ether1", false)]);
        clock.advance_secs(60);
        monitor.tick().unwrap();
        assert_eq!(sink.sent_count(), 1);

        // Still down on later sweeps: no repeat edge
        clock.advance_secs(60);
        monitor.tick().unwrap();
        assert_eq!(sink.sent_count(), 1);
    }

    #[test]
    fn test_first_sighting_down_is_silent() {
        let (mut monitor, telemetry, sink, _clock) = setup(Config::default());
        telemetry.add_device(1, "r1");
        telemetry.set_interfaces(1, vec![InterfaceRecord::new("ether1", false)]);

        monitor.tick().unwrap();
        assert_eq!(sink.sent_count(), 0);
    }

    #[test]
    fn test_excluded_and_disabled_interfaces_skipped() {
        let (mut monitor, telemetry, sink, clock) = setup(Config::default());
        telemetry.add_device(1, "r1");

        let mut disabled = InterfaceRecord::new("ether9", true);
        disabled.disabled = true;
        telemetry.set_interfaces(1, vec![InterfaceRecord::new("lo", true), disabled.clone()]);
        monitor.tick().unwrap();

        let mut disabled_down = disabled;
        disabled_down.running = false;
        telemetry.set_interfaces(
            1,
            vec![InterfaceRecord::new("lo", false), disabled_down],
        );
        clock.advance_secs(60);
        monitor.tick().unwrap();
        assert_eq!(sink.sent_count(), 0);
    }

    #[test]
    fn test_bandwidth_alert_with_trend() {
        let mut config = Config::default();
        config.alerts.high_bandwidth.duration_secs = 0;
        config.alerts.high_bandwidth.cooldown_secs = 0;
        let (mut monitor, telemetry, sink, clock) = setup(config);
        telemetry.add_device(1, "r1");

        let mut iface = InterfaceRecord::new("ether1", true);
        iface.speed = Some("1Gbps".to_string());
        telemetry.set_interfaces(1, vec![iface]);

        // Ramp up past 80% of 1 Gbps
        for rx in [500u64, 600, 700, 850, 900] {
            telemetry.set_traffic(1, "ether1", rx * 1_000_000, 100_000_000);
            monitor.tick().unwrap();
            clock.advance_secs(60);
        }

        let events = sink.events();
        let bandwidth: Vec<_> = events
            .iter()
            .filter(|e| e.kind == AlertKind::HighBandwidth)
            .collect();
        assert!(!bandwidth.is_empty());
        let last = bandwidth.last().unwrap();
        assert_eq!(last.details["interface"], "ether1");
        assert_eq!(last.details["max_speed"], "1.00 Gbps");
        // By the fifth sample the window is full and classified
        assert_eq!(last.details["trend"], "download increasing");
    }

    #[test]
    fn test_bandwidth_skipped_without_capacity() {
        let mut config = Config::default();
        config.alerts.high_bandwidth.duration_secs = 0;
        let (mut monitor, telemetry, sink, clock) = setup(config);
        telemetry.add_device(1, "r1");
        // No speed attributes and no type: capacity is unresolvable
        telemetry.set_interfaces(1, vec![InterfaceRecord::new("ether1", true)]);
        telemetry.set_traffic(1, "ether1", 950_000_000, 100_000_000);

        for _ in 0..3 {
            monitor.tick().unwrap();
            clock.advance_secs(60);
        }
        assert_eq!(sink.sent_count(), 0);
        // Samples were still collected for later trend analysis
        assert_eq!(monitor.history.len(1, "ether1"), 3);
    }

    #[test]
    fn test_bandwidth_sampled_while_link_down() {
        let (mut monitor, telemetry, _sink, clock) = setup(Config::default());
        telemetry.add_device(1, "r1");

        let mut iface = InterfaceRecord::new("ether1", false);
        iface.speed = Some("1Gbps".to_string());
        telemetry.set_interfaces(1, vec![iface]);
        telemetry.set_traffic(1, "ether1", 1_000_000, 500_000);

        // Down links keep feeding the history ring
        for _ in 0..3 {
            monitor.tick().unwrap();
            clock.advance_secs(60);
        }
        assert_eq!(monitor.history.len(1, "ether1"), 3);
    }

    #[test]
    fn test_status_fetch_failure_mutates_nothing() {
        let (mut monitor, telemetry, sink, clock) = setup(Config::default());
        telemetry.add_device(1, "r1");
        telemetry.fail_status_for(1, true);

        // Well past the retry budget: transport errors are not failed polls
        for _ in 0..5 {
            monitor.tick().unwrap();
            clock.advance_secs(60);
        }
        assert_eq!(sink.sent_count(), 0);
        assert!(monitor.tracker().get(1).is_none());

        // API recovers; the device reads connected with a clean slate
        telemetry.fail_status_for(1, false);
        monitor.tick().unwrap();
        assert!(monitor.tracker().is_connected(1));
        assert_eq!(monitor.tracker().get(1).unwrap().consecutive_failures, 0);
    }

    #[test]
    fn test_status_fetch_failure_preserves_failure_streak() {
        let (mut monitor, telemetry, sink, clock) = setup(Config::default());
        telemetry.add_device(1, "r1");
        telemetry.set_connected(1, false);

        monitor.tick().unwrap();
        clock.advance_secs(60);
        monitor.tick().unwrap();
        clock.advance_secs(60);

        // Transport error in the middle of a failure streak: counter untouched
        telemetry.fail_status_for(1, true);
        monitor.tick().unwrap();
        clock.advance_secs(60);
        assert_eq!(monitor.tracker().get(1).unwrap().consecutive_failures, 2);
        assert_eq!(sink.sent_count(), 0);

        // Streak resumes where it left off once the API answers again
        telemetry.fail_status_for(1, false);
        monitor.tick().unwrap();
        assert_eq!(kinds(&sink), vec![AlertKind::ConnectionLost]);
    }

    #[test]
    fn test_wireless_interference_fires_at_threshold() {
        let (mut monitor, telemetry, sink, clock) = setup(Config::default());
        telemetry.add_device(1, "r1");

        let mut wlan = InterfaceRecord::new("wlan1", true);
        wlan.kind = "wlan".to_string();
        wlan.signal_strength = Some(-85);
        telemetry.set_interfaces(1, vec![wlan.clone()]);

        monitor.tick().unwrap();
        assert_eq!(kinds(&sink), vec![AlertKind::WirelessInterference]);
        assert_eq!(sink.events()[0].details["signal_strength"], "-85 dBm");

        // Signal recovers above the default -80 dBm threshold
        wlan.signal_strength = Some(-60);
        telemetry.set_interfaces(1, vec![wlan]);
        clock.advance_secs(7200);
        monitor.tick().unwrap();
        assert_eq!(sink.sent_count(), 1);
    }

    #[test]
    fn test_run_stops_on_pending_signal() {
        let (mut monitor, telemetry, sink, _clock) = setup(Config::default());
        telemetry.add_device(1, "r1");
        telemetry.set_connected(1, false);

        // Signal already pending: the loop exits before the first sweep
        let (tx, rx) = std::sync::mpsc::channel();
        tx.send(()).unwrap();
        monitor.run(&rx);

        assert_eq!(monitor.tracker().device_count(), 0);
        assert_eq!(sink.sent_count(), 0);
    }

    #[test]
    fn test_disabled_rules_never_evaluate() {
        let mut config = Config::default();
        config.alerts.high_cpu.enabled = false;
        config.alerts.high_memory.enabled = false;
        config.alerts.high_cpu.duration_secs = 0;
        let (mut monitor, telemetry, sink, _clock) = setup(config);
        telemetry.add_device(1, "r1");
        telemetry.set_resources(1, 99.0, 990, 1000);

        monitor.tick().unwrap();
        assert_eq!(sink.sent_count(), 0);
        // Both rules off: the resources endpoint is not even queried
        assert!(monitor.tracker.get(1).unwrap().latest_resources.is_none());
    }
}
