//! Long-running services

mod monitor;

pub use monitor::Monitor;
