//! Notification sinks
//!
//! The boundary to whatever actually transmits alerts. Sinks are
//! fire-and-forget: delivery outcomes come back in a per-recipient report
//! and are never escalated to the poll loop.

use crate::alerts::AlertEvent;
use crate::error::Result;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Outcome of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The recipient accepted the alert
    Sent,
    /// Delivery failed with the given reason
    Failed(String),
}

impl DeliveryStatus {
    /// Whether this delivery succeeded
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Per-recipient success/failure map for one alert
pub type DeliveryReport = BTreeMap<String, DeliveryStatus>;

/// Notification channel trait
pub trait AlertSink: Send + Sync {
    /// Deliver an alert, reporting per-recipient outcomes
    fn send_alert(&self, event: &AlertEvent) -> Result<DeliveryReport>;

    /// Channel name for identification
    fn name(&self) -> &str;
}

impl<T: AlertSink + ?Sized> AlertSink for std::sync::Arc<T> {
    fn send_alert(&self, event: &AlertEvent) -> Result<DeliveryReport> {
        (**self).send_alert(event)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Terminal/console sink
///
/// Writes alerts to stderr with colored severity tags. Mostly useful when
/// running in the foreground or as the always-on fallback channel.
pub struct TerminalSink {
    use_colors: bool,
}

impl TerminalSink {
    /// Create a new terminal sink
    pub fn new() -> Self {
        Self {
            use_colors: Self::supports_color(),
        }
    }

    /// Create a sink without colors
    pub fn no_color() -> Self {
        Self { use_colors: false }
    }

    fn supports_color() -> bool {
        std::env::var("TERM")
            .map(|term| term != "dumb")
            .unwrap_or(false)
    }

    fn format_event(&self, event: &AlertEvent) -> String {
        let tag = if self.use_colors {
            format!("\x1b[33m{}\x1b[0m", event.kind)
        } else {
            event.kind.to_string()
        };

        let mut line = format!("[{}] {}: {}", tag, event.device_name, event.message);
        for (key, value) in &event.details {
            line.push_str(&format!("\n  {}: {}", key, value));
        }
        line
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSink for TerminalSink {
    fn send_alert(&self, event: &AlertEvent) -> Result<DeliveryReport> {
        let message = self.format_event(event);

        let stderr = io::stderr();
        let mut handle = stderr.lock();
        let status = match writeln!(handle, "{}", message) {
            Ok(()) => DeliveryStatus::Sent,
            Err(e) => DeliveryStatus::Failed(e.to_string()),
        };

        let mut report = DeliveryReport::new();
        report.insert(self.name().to_string(), status);
        Ok(report)
    }

    fn name(&self) -> &str {
        "terminal"
    }
}

/// Fan-out over multiple sinks
///
/// Aggregates every sink's report into one map keyed by channel name. A
/// failing sink never blocks the others.
pub struct SinkSet {
    sinks: Vec<Box<dyn AlertSink>>,
}

impl SinkSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a sink
    pub fn add_sink(&mut self, sink: Box<dyn AlertSink>) {
        self.sinks.push(sink);
    }

    /// Number of registered sinks
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for SinkSet {
    fn default() -> Self {
        let mut set = Self::new();
        set.add_sink(Box::new(TerminalSink::new()));
        set
    }
}

impl AlertSink for SinkSet {
    fn send_alert(&self, event: &AlertEvent) -> Result<DeliveryReport> {
        let mut report = DeliveryReport::new();
        for sink in &self.sinks {
            match sink.send_alert(event) {
                Ok(partial) => report.extend(partial),
                Err(e) => {
                    report.insert(
                        sink.name().to_string(),
                        DeliveryStatus::Failed(e.to_string()),
                    );
                }
            }
        }
        Ok(report)
    }

    fn name(&self) -> &str {
        "all"
    }
}
