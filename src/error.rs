//! Unified error types for routewatch
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error talking to the telemetry API
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error delivering a notification
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Device not found by id
    #[error("Device not found: {0}")]
    DeviceNotFound(i64),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from telemetry fetches
///
/// A closed set: the orchestrator pattern-matches on these and degrades
/// every variant to "skip this check, continue the loop".
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Endpoint could not be reached (connection refused, DNS, ...)
    #[error("Telemetry source unreachable: {0}")]
    Unreachable(String),

    /// Non-2xx HTTP status
    #[error("Telemetry source returned HTTP {0}")]
    Status(u16),

    /// Response body did not match the expected shape
    #[error("Malformed telemetry response: {0}")]
    Malformed(String),
}

impl TelemetryError {
    /// Classify a reqwest error into the closed failure set
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Unreachable(err.to_string())
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error while reading or writing the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from notification sinks
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The sink could not deliver the alert
    #[error("Delivery failed via {channel}: {message}")]
    DeliveryFailed { channel: String, message: String },

    /// IO error while writing the notification
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_error_display() {
        let err = TelemetryError::Status(503);
        assert_eq!(err.to_string(), "Telemetry source returned HTTP 503");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "general.check_interval".to_string(),
            message: "must be positive".to_string(),
        };
        assert!(err.to_string().contains("general.check_interval"));
    }

    #[test]
    fn test_error_conversion() {
        let tele_err = TelemetryError::Timeout;
        let app_err: AppError = tele_err.into();
        assert!(matches!(app_err, AppError::Telemetry(_)));
    }

    #[test]
    fn test_notify_error_display() {
        let err = NotifyError::DeliveryFailed {
            channel: "terminal".to_string(),
            message: "broken pipe".to_string(),
        };
        assert!(err.to_string().contains("terminal"));
    }
}
