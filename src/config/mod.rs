//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.forgebar.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `FORGEBAR_TOKEN`, `FORGEBAR_DATABASE_URL`,
//!    and friends, or legacy `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--token`/`-t`, `--command`/`-c`, ...
//!
//! # Configuration File
//!
//! Place `.forgebar.toml` in the current directory, home directory, or
//! XDG config directory with:
//!
//! ```toml
//! token = "ghp_example"
//! database_url = "forgebar.sqlite"
//! api_base = "https://api.github.com"
//! watch = true
//! full_refresh_interval_seconds = 300
//! workflow_refresh_interval_seconds = 60
//! ```

use std::env;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::github::ForgeError;
use crate::watch::RefreshSchedule;

/// Database path used when none is configured.
pub const DEFAULT_DATABASE_URL: &str = "forgebar.sqlite";

/// GitHub REST endpoint used when none is configured.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const DEFAULT_FULL_REFRESH_SECONDS: u64 = 300;
const DEFAULT_WORKFLOW_REFRESH_SECONDS: u64 = 60;

/// Operation mode determined by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Apply database migrations and exit.
    MigrateDatabase,
    /// Run a single JSON command and print its response.
    RunCommand,
    /// Refresh on a schedule until interrupted.
    Watch,
    /// Run one full refresh and print the sidebar.
    Refresh,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `FORGEBAR_TOKEN`, `GITHUB_TOKEN`, or `--token`: Authentication token
/// - `FORGEBAR_DATABASE_URL` or `--database-url`: Local `SQLite` database path
/// - `FORGEBAR_API_BASE` or `--api-base`: GitHub API endpoint
/// - `FORGEBAR_COMMAND` or `--command`: JSON command to run once
///
/// # Example
///
/// ```no_run
/// use forgebar::ForgebarConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = ForgebarConfig::load().expect("failed to load configuration");
/// let schedule = config.schedule();
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "FORGEBAR",
    discovery(
        dotfile_name = ".forgebar.toml",
        config_file_name = "forgebar.toml",
        app_name = "forgebar"
    )
)]
pub struct ForgebarConfig {
    /// Personal access token for GitHub API authentication.
    ///
    /// When present it replaces the stored credential at start-up.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `FORGEBAR_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Local `SQLite` database URL/path holding the sidebar records.
    ///
    /// Can be provided via:
    /// - CLI: `--database-url <PATH>`
    /// - Environment: `FORGEBAR_DATABASE_URL`
    /// - Config file: `database_url = "..."`
    #[ortho_config()]
    pub database_url: String,

    /// Base URL of the GitHub REST API.
    ///
    /// The GraphQL endpoint is derived from the same base.
    #[ortho_config()]
    pub api_base: String,

    /// A JSON command to run once, such as
    /// `{"type":"track_repo","repo":"acme/widgets"}`.
    ///
    /// Can be provided via:
    /// - CLI: `--command <JSON>` or `-c <JSON>`
    /// - Environment: `FORGEBAR_COMMAND`
    #[ortho_config(cli_short = 'c')]
    pub command: Option<String>,

    /// Applies pending migrations and exits without contacting GitHub.
    #[ortho_config()]
    pub migrate_db: bool,

    /// Keeps refreshing until interrupted.
    ///
    /// Note: Environment variable `FORGEBAR_WATCH` is not supported because
    /// `ortho_config` does not load boolean values from the environment.
    #[ortho_config(cli_short = 'w')]
    pub watch: bool,

    /// Period of the full refresh in watch mode, in seconds.
    #[ortho_config()]
    pub full_refresh_interval_seconds: u64,

    /// Period of the workflow-run refresh in watch mode, in seconds.
    #[ortho_config()]
    pub workflow_refresh_interval_seconds: u64,

    /// Writes telemetry events to stderr as JSON lines.
    #[ortho_config()]
    pub telemetry: bool,
}

impl Default for ForgebarConfig {
    fn default() -> Self {
        Self {
            token: None,
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            api_base: DEFAULT_API_BASE.to_owned(),
            command: None,
            migrate_db: false,
            watch: false,
            full_refresh_interval_seconds: DEFAULT_FULL_REFRESH_SECONDS,
            workflow_refresh_interval_seconds: DEFAULT_WORKFLOW_REFRESH_SECONDS,
            telemetry: false,
        }
    }
}

impl ForgebarConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// A missing token is not an error: the credential saved in the store
    /// is used instead.
    #[must_use]
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .filter(|token| !token.trim().is_empty())
    }

    /// Parses the configured one-shot command.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::Configuration`] when the command is not valid
    /// JSON or names an unknown command.
    pub fn parse_command(&self) -> Result<Option<Command>, ForgeError> {
        self.command
            .as_deref()
            .map(|raw| {
                serde_json::from_str(raw).map_err(|error| ForgeError::Configuration {
                    message: format!("invalid command: {error}"),
                })
            })
            .transpose()
    }

    /// Determines the operation mode.
    ///
    /// Migration wins over everything else, then an explicit command, then
    /// watch mode. Without any of those a single refresh runs.
    #[must_use]
    pub const fn operation_mode(&self) -> OperationMode {
        if self.migrate_db {
            OperationMode::MigrateDatabase
        } else if self.command.is_some() {
            OperationMode::RunCommand
        } else if self.watch {
            OperationMode::Watch
        } else {
            OperationMode::Refresh
        }
    }

    /// Refresh periods for watch mode.
    #[must_use]
    pub const fn schedule(&self) -> RefreshSchedule {
        RefreshSchedule::from_seconds(
            self.full_refresh_interval_seconds,
            self.workflow_refresh_interval_seconds,
        )
    }
}

#[cfg(test)]
mod tests;
