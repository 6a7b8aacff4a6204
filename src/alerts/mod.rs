//! Alert engine
//!
//! Threshold and edge detection, cooldown-gated deduplication, and
//! dispatch to notification sinks.

mod cooldown;
mod dispatcher;
mod threshold;
mod types;

pub use cooldown::CooldownGate;
pub use dispatcher::AlertDispatcher;
pub use threshold::{ThresholdEvaluator, ThresholdState};
pub use types::{AlertEvent, AlertKey, AlertKind};
