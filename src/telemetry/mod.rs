//! Telemetry source abstraction
//!
//! The read-only boundary to the device-telemetry API. The trait exists so
//! the poll loop can run against mocks in tests while production uses the
//! blocking HTTP client.

mod http;
mod traits;

pub use http::HttpTelemetry;
pub use traits::TelemetryClient;
