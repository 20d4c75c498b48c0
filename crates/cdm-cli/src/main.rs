//! CDM CLI - Command-line access to the CDM appliance REST API
//!
//! Entry point for the `cdm` binary: sends node-relative API calls and
//! follows asynchronous jobs to completion.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

#[tokio::main]
async fn main() {
    // Credentials may come from a .env file next to the invocation
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!(
                "{}",
                error::format_error(&e, control::SHOULD_COLORIZE.should_colorize())
            );

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(command = ?cli.command))]
async fn run(cli: Cli) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let config = {
        let _config_timer = Timer::new("config_loading");
        let mut config = Config::load_with_file(cli.config.as_deref())?;
        config.apply_overrides(&cli.connection)?;
        config
    };

    let mut output = OutputWriter::new(
        cli.output,
        cli.use_color() && config.output.color,
        cli.quiet,
    );
    if !config.output.progress {
        output = output.without_progress();
    }

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Get(args) => {
            let client = handlers::build_client(&config, &mut output)?;
            handlers::handle_get(args, &client, &mut output).await
        }
        Commands::Post(args) => {
            let client = handlers::build_client(&config, &mut output)?;
            handlers::handle_post(args, &client, &mut output).await
        }
        Commands::Patch(args) => {
            let client = handlers::build_client(&config, &mut output)?;
            handlers::handle_patch(args, &client, &mut output).await
        }
        Commands::Delete(args) => {
            let client = handlers::build_client(&config, &mut output)?;
            handlers::handle_delete(args, &client, &mut output).await
        }
        Commands::JobStatus(args) => {
            let client = handlers::build_client(&config, &mut output)?;
            handlers::handle_job_status(args, &client, &mut output).await
        }
        Commands::Config(args) => handlers::handle_config(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.merge_with_env();

    // Quiet mode only reports errors
    if cli.quiet {
        logging_config.level = "error".to_string();
    }

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["cdm", "-v", "delete", "v1", "/sla_domain/abc"]);
        assert_eq!(cli.verbosity_level(), 1);
        assert!(matches!(cli.command, Commands::Delete(_)));

        let cli = Cli::parse_from(["cdm", "config", "paths"]);
        assert!(matches!(cli.command, Commands::Config(_)));
    }
}
