//! Config command implementation

use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::{Config, ConfigFile};
use crate::error::{ConfigError, Result};

/// Execute a config subcommand
pub fn run_config(args: &ConfigArgs, config_path: Option<&str>) -> Result<()> {
    match &args.command {
        ConfigCommands::Show => {
            let config = super::load_config(config_path)?;
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| ConfigError::ParseError(format!("Failed to serialize: {}", e)))?;
            print!("{}", rendered);
            Ok(())
        }
        ConfigCommands::Init { path } => {
            let path = path.as_deref().unwrap_or("routewatch.toml");
            ConfigFile::save(&Config::default(), path)?;
            println!("Wrote default configuration to {}", path);
            Ok(())
        }
    }
}
