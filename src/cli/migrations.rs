//! Database migration operations.

use forgebar::persistence::{PersistenceError, migrate_database};
use forgebar::telemetry::TelemetrySink;
use forgebar::{ForgeError, ForgebarConfig};

/// Runs database migrations.
///
/// # Errors
///
/// Returns [`ForgeError::Configuration`] if the database URL is blank.
/// Returns [`ForgeError::Storage`] for connection or migration failures.
pub fn run(config: &ForgebarConfig, telemetry: &dyn TelemetrySink) -> Result<(), ForgeError> {
    let schema_version = migrate_database(&config.database_url, telemetry)
        .map_err(|error| map_persistence_error(&error))?;
    if schema_version.is_current() {
        tracing::info!(
            "database {} at schema version {schema_version}",
            config.database_url
        );
    } else {
        tracing::warn!(
            "database {} reports schema version {schema_version}, newer than this build",
            config.database_url
        );
    }
    Ok(())
}

/// Maps a persistence error to a forge error.
///
/// Configuration-related errors (blank URL) become
/// [`ForgeError::Configuration`], while runtime errors become
/// [`ForgeError::Storage`].
#[must_use]
pub fn map_persistence_error(error: &PersistenceError) -> ForgeError {
    if is_configuration_error(error) {
        ForgeError::Configuration {
            message: error.to_string(),
        }
    } else {
        ForgeError::Storage {
            message: error.to_string(),
        }
    }
}

/// Returns true if the persistence error is a configuration problem.
const fn is_configuration_error(error: &PersistenceError) -> bool {
    matches!(error, PersistenceError::BlankDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use forgebar::persistence::{CURRENT_SCHEMA_VERSION, PersistenceError};
    use forgebar::telemetry::TelemetryEvent;
    use forgebar::telemetry::test_support::RecordingSink;
    use forgebar::{ForgeError, ForgebarConfig};
    use rstest::rstest;

    use super::{is_configuration_error, map_persistence_error, run};

    #[test]
    fn persistence_error_classification_separates_blank_url() {
        assert!(is_configuration_error(&PersistenceError::BlankDatabaseUrl));
        assert!(!is_configuration_error(&PersistenceError::SchemaNotInitialised));
        assert!(
            matches!(
                map_persistence_error(&PersistenceError::SchemaNotInitialised),
                ForgeError::Storage { .. }
            ),
            "runtime failures should map to ForgeError::Storage"
        );
    }

    #[rstest]
    fn migrate_db_rejects_blank_database_url() {
        let config = ForgebarConfig {
            database_url: "   ".to_owned(),
            migrate_db: true,
            ..Default::default()
        };
        let telemetry = RecordingSink::default();

        let result = run(&config, &telemetry);

        match result {
            Err(ForgeError::Configuration { message }) => assert!(
                message.starts_with("database URL must not be blank"),
                "unexpected message {message:?}"
            ),
            other => panic!("expected Configuration error, got {other:?}"),
        }
        assert!(telemetry.take().is_empty(), "no schema version recorded");
    }

    #[rstest]
    fn migrate_db_records_schema_version() {
        let directory = tempfile::tempdir().expect("temporary directory");
        let database = directory.path().join("forgebar.sqlite");
        let config = ForgebarConfig {
            database_url: database.to_string_lossy().into_owned(),
            migrate_db: true,
            ..Default::default()
        };
        let telemetry = RecordingSink::default();

        run(&config, &telemetry).expect("migrations should apply");

        assert_eq!(
            telemetry.take(),
            vec![TelemetryEvent::SchemaVersionRecorded {
                schema_version: CURRENT_SCHEMA_VERSION.to_owned(),
            }]
        );
    }
}
