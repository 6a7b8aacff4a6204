//! Run command implementation
//!
//! Starts the monitoring daemon: builds the telemetry client and alert
//! sinks from configuration, then hands off to the sweep loop until
//! Ctrl-C.

use crate::cli::args::RunArgs;
use crate::clock::SystemClock;
use crate::error::Result;
use crate::notify::SinkSet;
use crate::services::Monitor;
use crate::telemetry::HttpTelemetry;

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

/// Execute the run command
pub fn run_daemon(args: &RunArgs, config_path: Option<&str>) -> Result<()> {
    let mut config = super::load_config(config_path)?;

    if let Some(interval) = args.interval {
        config.general.check_interval_secs = interval;
    }
    if let Some(url) = &args.url {
        config.telemetry.base_url = url.clone();
    }

    let telemetry = HttpTelemetry::new(
        config.telemetry.base_url.clone(),
        Duration::from_secs(config.general.connection_timeout_secs),
    )?;

    let mut monitor = Monitor::new(
        config,
        telemetry,
        Box::new(SinkSet::default()),
        Arc::new(SystemClock),
    );

    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        log::info!("Shutdown signal received");
        // The loop also stops when the sender is dropped
        let _ = stop_tx.send(());
    })
    .map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to install signal handler: {}", e),
        )
    })?;

    monitor.run(&stop_rx);
    Ok(())
}
