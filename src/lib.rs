//! routewatch - network device monitoring and alerting
//!
//! Polls a device-telemetry API on a fixed interval, evaluates
//! connectivity, resource, link-state and bandwidth alert rules against
//! what it sees, and dispatches cooldown-gated notifications.

pub mod alerts;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod services;
pub mod telemetry;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
