//! forgebar CLI entrypoint for the GitHub sidebar.

mod cli;

use std::io::{self, Write};
use std::process::ExitCode;

use forgebar::{Command, ForgeError, ForgebarConfig, OperationMode};
use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ForgeError> {
    let config = load_config()?;
    let telemetry = cli::session::telemetry_sink(&config);

    match config.operation_mode() {
        OperationMode::MigrateDatabase => cli::migrations::run(&config, telemetry.as_ref()),
        OperationMode::RunCommand => {
            let command = config
                .parse_command()?
                .ok_or_else(|| ForgeError::Configuration {
                    message: "no command configured".to_owned(),
                })?;
            let dispatcher = cli::session::open(&config, telemetry).await?;
            cli::single_command::run(&dispatcher, command).await
        }
        OperationMode::Watch => {
            let dispatcher = cli::session::open(&config, telemetry).await?;
            cli::watch_mode::run(&dispatcher, config.schedule()).await;
            Ok(())
        }
        OperationMode::Refresh => {
            let dispatcher = cli::session::open(&config, telemetry).await?;
            cli::single_command::run(&dispatcher, Command::Refresh).await
        }
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ForgeError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<ForgebarConfig, ForgeError> {
    ForgebarConfig::load().map_err(|error| ForgeError::Configuration {
        message: error.to_string(),
    })
}
