//! GreenFrame scenario container CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Container creation failure
//! - 4: Container start failure
//! - 5: Scenario failure

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use greenframe_runner::ContainerError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CREATION_FAILURE: u8 = 3;
    pub const START_FAILURE: u8 = 4;
    pub const SCENARIO_FAILURE: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,greenframe_runner=info,greenframe_cli=info"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(ExitCodes::INVALID_ARGS)
            } else {
                ExitCode::from(ExitCodes::SUCCESS)
            };
        }
    };

    let container = cli.container;
    let result = match cli.command {
        Commands::Create(args) => commands::create::execute(container, args).await,
        Commands::Start(args) => commands::start::execute(container, args).await,
        Commands::Exec(args) => commands::exec::execute(container, args).await,
        Commands::Stop(args) => commands::stop::execute(container, args).await,
        Commands::Run(args) => commands::run::execute(container, args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(categorize_error(&e))
        }
    }
}

/// Map an error to its exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<ContainerError>() {
        Some(ContainerError::Creation(_)) => ExitCodes::CREATION_FAILURE,
        Some(ContainerError::Start(_)) => ExitCodes::START_FAILURE,
        Some(ContainerError::Scenario(_)) => ExitCodes::SCENARIO_FAILURE,
        Some(ContainerError::Stop(_)) | None => ExitCodes::GENERAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_container_errors() {
        let creation = anyhow::Error::new(ContainerError::Creation("boom".to_string()));
        let scenario = anyhow::Error::new(ContainerError::Scenario("boom".to_string()));
        let other = anyhow::anyhow!("something else");

        assert_eq!(categorize_error(&creation), ExitCodes::CREATION_FAILURE);
        assert_eq!(categorize_error(&scenario), ExitCodes::SCENARIO_FAILURE);
        assert_eq!(categorize_error(&other), ExitCodes::GENERAL_ERROR);
    }

    #[test]
    fn test_categorize_with_context() {
        use anyhow::Context;
        let err: anyhow::Result<()> = Err(ContainerError::Start("x".to_string()).into());
        let err = err.context("Failed to start container").unwrap_err();
        assert_eq!(categorize_error(&err), ExitCodes::START_FAILURE);
    }
}
