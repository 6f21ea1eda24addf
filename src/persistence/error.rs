//! Error types for local persistence operations.

use thiserror::Error;

/// Errors returned while migrating or accessing the sidebar record store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    /// The database URL/path was present but blank.
    #[error("database URL must not be blank (use --database-url or FORGEBAR_DATABASE_URL)")]
    BlankDatabaseUrl,

    /// Establishing a `SQLite` connection failed.
    #[error("failed to connect to SQLite database: {message}")]
    ConnectionFailed {
        /// Error detail from Diesel.
        message: String,
    },

    /// Running pending migrations failed.
    #[error("failed to run database migrations: {message}")]
    MigrationFailed {
        /// Error detail from Diesel migrations.
        message: String,
    },

    /// Reading the schema version from the migration table failed.
    #[error("failed to read schema version after migrations: {message}")]
    SchemaVersionQueryFailed {
        /// Error detail from Diesel query execution.
        message: String,
    },

    /// The migrations completed but no schema version could be found.
    #[error("no schema version recorded after migrations ran")]
    MissingSchemaVersion,

    /// The record table does not exist; migrations have not been applied.
    #[error("sidebar record table is missing; database migrations have not been applied")]
    SchemaNotInitialised,

    /// Reading a record failed.
    #[error("failed to read sidebar record: {message}")]
    QueryFailed {
        /// Error detail from Diesel.
        message: String,
    },

    /// Writing a record failed.
    #[error("failed to write sidebar record: {message}")]
    WriteFailed {
        /// Error detail from Diesel.
        message: String,
    },

    /// A stored record could not be encoded or decoded.
    #[error("sidebar record `{key}` is malformed: {message}")]
    MalformedRecord {
        /// Storage key of the record.
        key: String,
        /// Error detail from `serde_json`.
        message: String,
    },

    /// A blocking database task could not complete.
    #[error("database task failed: {message}")]
    TaskFailed {
        /// Error detail from the Tokio runtime.
        message: String,
    },
}
