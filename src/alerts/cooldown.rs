//! Cooldown gate
//!
//! Time-gated permission to re-fire a named alert. The first occurrence of
//! a key always passes; after that a key passes only once per cooldown
//! window. The recorded timestamp advances only on a pass, so a suppressed
//! attempt does not push the window out.

use crate::alerts::types::AlertKey;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Per-condition send-time memory
#[derive(Debug, Default)]
pub struct CooldownGate {
    last_sent: HashMap<AlertKey, DateTime<Utc>>,
}

impl CooldownGate {
    /// Create an empty gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an alert for this key may be sent now
    ///
    /// Records `now` and returns true for an unseen key or once the
    /// cooldown has elapsed (boundary-inclusive); otherwise returns false
    /// without touching the stored timestamp.
    pub fn can_send(&mut self, key: &AlertKey, cooldown: Duration, now: DateTime<Utc>) -> bool {
        match self.last_sent.get(key) {
            None => {
                self.last_sent.insert(key.clone(), now);
                true
            }
            Some(last) if now - *last >= cooldown => {
                self.last_sent.insert(key.clone(), now);
                true
            }
            Some(_) => false,
        }
    }

    /// Number of keys ever observed
    pub fn tracked_keys(&self) -> usize {
        self.last_sent.len()
    }
}
