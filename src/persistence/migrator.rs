//! Schema management for the sidebar `SQLite` database.
//!
//! Migrations are embedded at compile time and applied in version order.
//! Applying them to an up-to-date database is a no-op, so every start-up may
//! call [`migrate_database`].

use std::fmt;

use diesel::Connection;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::telemetry::{TelemetryEvent, TelemetrySink};

use super::PersistenceError;

/// Embedded Diesel migrations shipped with the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Version of the migration that creates `sidebar_records`.
pub const INITIAL_SCHEMA_VERSION: &str = "20261001000000";

/// Schema version produced by the newest embedded migration.
pub const CURRENT_SCHEMA_VERSION: &str = INITIAL_SCHEMA_VERSION;

/// Version of the newest migration applied to a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaVersion(String);

impl SchemaVersion {
    /// Returns the inner version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when no embedded migration is newer.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.0 == CURRENT_SCHEMA_VERSION
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Applies pending migrations to the database at `database_url` and records
/// the resulting schema version in telemetry.
///
/// # Errors
///
/// Returns [`PersistenceError::BlankDatabaseUrl`] for a blank URL, and a
/// connection, migration or schema-version error when the database cannot be
/// brought up to date.
pub fn migrate_database(
    database_url: &str,
    telemetry: &dyn TelemetrySink,
) -> Result<SchemaVersion, PersistenceError> {
    let mut connection = open_connection(database_url)?;

    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|error| PersistenceError::MigrationFailed {
            message: error.to_string(),
        })?;
    if applied.is_empty() {
        tracing::debug!("sidebar schema already up to date");
    } else {
        tracing::info!("applied {} sidebar migration(s)", applied.len());
    }

    let schema_version = newest_applied_version(&mut connection)?;
    telemetry.record(TelemetryEvent::SchemaVersionRecorded {
        schema_version: schema_version.as_str().to_owned(),
    });
    Ok(schema_version)
}

fn open_connection(database_url: &str) -> Result<SqliteConnection, PersistenceError> {
    let trimmed = database_url.trim();
    if trimmed.is_empty() {
        return Err(PersistenceError::BlankDatabaseUrl);
    }

    SqliteConnection::establish(trimmed).map_err(|error| PersistenceError::ConnectionFailed {
        message: error.to_string(),
    })
}

fn newest_applied_version(
    connection: &mut SqliteConnection,
) -> Result<SchemaVersion, PersistenceError> {
    let versions = connection.applied_migrations().map_err(|error| {
        PersistenceError::SchemaVersionQueryFailed {
            message: error.to_string(),
        }
    })?;

    versions
        .into_iter()
        .max()
        .map(|version| SchemaVersion(version.to_string()))
        .ok_or(PersistenceError::MissingSchemaVersion)
}
