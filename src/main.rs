//! routewatch - network device monitoring and alerting daemon

use clap::Parser;
use routewatch::cli::args::{Cli, Commands};
use routewatch::commands::{run_check, run_config, run_daemon};
use routewatch::error::AppError;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Set log level based on verbose flag
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Run(args) => run_daemon(args, config_path),

        Commands::Check => run_check(config_path),

        Commands::Config(args) => run_config(args, config_path),
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Telemetry(routewatch::error::TelemetryError::Unreachable(_)) => {
            eprintln!();
            eprintln!("Hint: Make sure the telemetry API is running and the");
            eprintln!("      [telemetry] base_url in the config is correct.");
        }
        AppError::Config(routewatch::error::ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Run 'routewatch config init' to create a default");
            eprintln!("      configuration file.");
        }
        _ => {}
    }
}
