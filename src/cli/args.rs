//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};

/// Network device monitoring and alerting daemon
///
/// Polls device telemetry on an interval, evaluates alert rules and
/// dispatches notifications with per-alert cooldowns.
#[derive(Parser, Debug)]
#[command(name = "routewatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "ROUTEWATCH_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitoring daemon
    Run(RunArgs),

    /// Run a single poll sweep and exit
    Check,

    /// Inspect or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Override the poll interval in seconds
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Override the telemetry API base URL
    #[arg(long)]
    pub url: Option<String>,
}

/// Arguments for config subcommands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Write a default configuration file
    Init {
        /// Destination path (defaults to ./routewatch.toml)
        path: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_check() {
        let args = Cli::try_parse_from(["routewatch", "check"]).unwrap();
        assert!(matches!(args.command, Commands::Check));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let args = Cli::try_parse_from(["routewatch", "-v", "check"]).unwrap();
        assert!(args.verbose);
    }

    #[test]
    fn test_cli_parse_run_overrides() {
        let args = Cli::try_parse_from([
            "routewatch",
            "run",
            "--interval",
            "30",
            "--url",
            "http://10.0.0.1:3000/api",
        ])
        .unwrap();

        if let Commands::Run(run) = args.command {
            assert_eq!(run.interval, Some(30));
            assert_eq!(run.url.as_deref(), Some("http://10.0.0.1:3000/api"));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_config_path() {
        let args =
            Cli::try_parse_from(["routewatch", "--config", "/tmp/rw.toml", "check"]).unwrap();
        assert_eq!(args.config.as_deref(), Some("/tmp/rw.toml"));
    }

    #[test]
    fn test_cli_parse_config_init() {
        let args = Cli::try_parse_from(["routewatch", "config", "init", "custom.toml"]).unwrap();
        if let Commands::Config(config) = args.command {
            if let ConfigCommands::Init { path } = config.command {
                assert_eq!(path.as_deref(), Some("custom.toml"));
            } else {
                panic!("Expected Init command");
            }
        } else {
            panic!("Expected Config command");
        }
    }
}
