//! Configuration file loading
//!
//! Handles loading configuration from TOML files. Load failure is never
//! fatal to the monitor: callers fall back to `Config::default()` and the
//! default is only persisted on an explicit save.

use crate::config::Config;
use crate::error::ConfigError;

use std::path::{Path, PathBuf};

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from the first default location that parses, else defaults
    pub fn load_or_default() -> Config {
        for path in Self::default_paths() {
            if path.exists() {
                match Self::load(&path) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        log::warn!("Ignoring config at {}: {}", path.display(), e);
                    }
                }
            }
        }
        log::info!("No config file found, using defaults");
        Config::default()
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(config: &Config, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(config)
            .map_err(|e| ConfigError::ParseError(format!("Failed to serialize: {}", e)))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Get default configuration file paths, most specific last
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // System-wide config
        paths.push(PathBuf::from("/etc/routewatch/config.toml"));

        // User config
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("routewatch").join("config.toml"));
        }

        // Current directory
        paths.push(PathBuf::from("routewatch.toml"));
        paths.push(PathBuf::from(".routewatch.toml"));

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_not_empty() {
        let paths = ConfigFile::default_paths();
        assert!(!paths.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigFile::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.general.check_interval_secs = 15;
        config.alerts.high_bandwidth.threshold = 70.0;

        ConfigFile::save(&config, &path).unwrap();
        let loaded = ConfigFile::load(&path).unwrap();

        assert_eq!(loaded.general.check_interval_secs, 15);
        assert_eq!(loaded.alerts.high_bandwidth.threshold, 70.0);
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is { not toml").unwrap();

        assert!(ConfigFile::load(&path).is_err());
    }
}
