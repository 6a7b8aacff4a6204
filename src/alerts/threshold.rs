//! Sustained-threshold crossing detection
//!
//! A generic state machine shared by the CPU, memory, and bandwidth
//! checks. A metric must stay at or above its threshold for the full
//! sustain duration before the evaluator reports Firing; it keeps
//! reporting Firing every tick the condition holds (the cooldown gate
//! handles deduplication downstream).
//!
//! There is no hysteresis band: the instant a metric dips under the
//! threshold its timer is deleted, and the next crossing starts the full
//! sustain wait over. A metric oscillating exactly at the threshold can
//! therefore be suppressed indefinitely. That trade of precision for
//! simplicity is intentional and carried over from the original behavior.

use crate::alerts::types::AlertKey;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Where a metric stands relative to its threshold and sustain timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdState {
    /// Under threshold; no timer running
    Below,
    /// Over threshold, but not yet for the sustain duration
    Pending,
    /// Over threshold for at least the sustain duration
    Firing,
}

/// Tracks first-crossing timestamps per monitored condition
#[derive(Debug, Default)]
pub struct ThresholdEvaluator {
    since: HashMap<AlertKey, DateTime<Utc>>,
}

impl ThresholdEvaluator {
    /// Create an empty evaluator
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one observation and classify the condition's state
    ///
    /// Crossing is threshold-inclusive (`value >= threshold`), and so is
    /// the sustain check: the evaluator fires on the first tick at or
    /// after the duration has elapsed since the recorded crossing.
    pub fn evaluate(
        &mut self,
        key: &AlertKey,
        value: f64,
        threshold: f64,
        sustain: Duration,
        now: DateTime<Utc>,
    ) -> ThresholdState {
        if value < threshold {
            self.since.remove(key);
            return ThresholdState::Below;
        }

        let since = *self.since.entry(key.clone()).or_insert(now);
        if now - since >= sustain {
            ThresholdState::Firing
        } else {
            ThresholdState::Pending
        }
    }

    /// When the condition first crossed its threshold, if it is over now
    pub fn pending_since(&self, key: &AlertKey) -> Option<DateTime<Utc>> {
        self.since.get(key).copied()
    }
}
