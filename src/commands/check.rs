//! Check command implementation
//!
//! Runs a single poll sweep against the configured telemetry source
//! and prints a short summary. Useful for validating connectivity and
//! configuration before starting the daemon.

use crate::clock::SystemClock;
use crate::error::Result;
use crate::notify::SinkSet;
use crate::services::Monitor;
use crate::telemetry::HttpTelemetry;

use std::sync::Arc;
use std::time::Duration;

/// Execute the check command
pub fn run_check(config_path: Option<&str>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let base_url = config.telemetry.base_url.clone();

    let telemetry = HttpTelemetry::new(
        base_url.clone(),
        Duration::from_secs(config.general.connection_timeout_secs),
    )?;

    let mut monitor = Monitor::new(
        config,
        telemetry,
        Box::new(SinkSet::default()),
        Arc::new(SystemClock),
    );

    let polled = monitor.tick()?;
    println!("Polled {} devices from {}", polled, base_url);

    for id in monitor.tracker().device_ids() {
        if let Some(status) = monitor.tracker().get(id) {
            let state = if status.connected { "up" } else { "down" };
            println!("  device {}: {} ({} interfaces)", id, state, status.interfaces.len());
        }
    }

    Ok(())
}
