//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod check;
pub mod config;
pub mod run;

pub use check::run_check;
pub use config::run_config;
pub use run::run_daemon;

use crate::config::{Config, ConfigFile};
use crate::error::Result;

/// Load configuration from an explicit path, or the default search order
pub(crate) fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => Ok(ConfigFile::load(path)?),
        None => Ok(ConfigFile::load_or_default()),
    }
}
