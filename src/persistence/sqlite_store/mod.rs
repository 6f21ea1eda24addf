//! Sidebar record storage backed by `SQLite`.
//!
//! Records live in the `sidebar_records` table created by the embedded
//! migrations. Each record is one row holding the JSON text of its value.
//! Diesel connections are synchronous, so every call runs on Tokio's
//! blocking pool with a fresh connection.

use async_trait::async_trait;
use diesel::Connection;
use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text};
use diesel::sqlite::SqliteConnection;
use serde_json::Value;

use super::PersistenceError;
use super::record_store::{RecordKey, RecordStore};

const SIDEBAR_RECORDS_TABLE: &str = "sidebar_records";

/// [`RecordStore`] persisting records to a `SQLite` database file.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    database_url: String,
}

impl SqliteRecordStore {
    /// Creates a store for `database_url`.
    ///
    /// The schema is not checked here; run
    /// [`migrate_database`](super::migrate_database) first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDatabaseUrl`] when the URL is blank.
    pub fn new(database_url: impl Into<String>) -> Result<Self, PersistenceError> {
        let database_url_string = database_url.into();
        if database_url_string.trim().is_empty() {
            return Err(PersistenceError::BlankDatabaseUrl);
        }
        Ok(Self {
            database_url: database_url_string.trim().to_owned(),
        })
    }

    async fn run_blocking<T, F>(&self, operation: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&str) -> Result<T, PersistenceError> + Send + 'static,
    {
        let database_url = self.database_url.clone();
        tokio::task::spawn_blocking(move || operation(&database_url))
            .await
            .map_err(|error| PersistenceError::TaskFailed {
                message: error.to_string(),
            })?
    }
}

fn establish_connection(database_url: &str) -> Result<SqliteConnection, PersistenceError> {
    SqliteConnection::establish(database_url).map_err(|error| PersistenceError::ConnectionFailed {
        message: error.to_string(),
    })
}

fn load_record(database_url: &str, key: RecordKey) -> Result<Option<Value>, PersistenceError> {
    #[derive(Debug, QueryableByName)]
    struct Row {
        #[diesel(sql_type = Text)]
        value: String,
    }

    let mut connection = establish_connection(database_url)?;

    let result: Option<Row> =
        sql_query("SELECT value FROM sidebar_records WHERE record_key = ? LIMIT 1;")
            .bind::<Text, _>(key.as_str())
            .get_result(&mut connection)
            .optional()
            .map_err(|error| map_query_error(&mut connection, &error))?;

    result
        .map(|row| {
            serde_json::from_str(&row.value).map_err(|error| PersistenceError::MalformedRecord {
                key: key.as_str().to_owned(),
                message: error.to_string(),
            })
        })
        .transpose()
}

fn save_record(database_url: &str, key: RecordKey, value: &Value) -> Result<(), PersistenceError> {
    let encoded = serde_json::to_string(value).map_err(|error| PersistenceError::MalformedRecord {
        key: key.as_str().to_owned(),
        message: error.to_string(),
    })?;
    let mut connection = establish_connection(database_url)?;

    sql_query(
        "INSERT INTO sidebar_records (record_key, value) VALUES (?, ?) \
         ON CONFLICT(record_key) DO UPDATE SET \
           value = excluded.value, \
           updated_at = CURRENT_TIMESTAMP;",
    )
    .bind::<Text, _>(key.as_str())
    .bind::<Text, _>(encoded)
    .execute(&mut connection)
    .map(drop)
    .map_err(|error| map_write_error(&mut connection, &error))
}

fn delete_record(database_url: &str, key: RecordKey) -> Result<(), PersistenceError> {
    let mut connection = establish_connection(database_url)?;

    sql_query("DELETE FROM sidebar_records WHERE record_key = ?;")
        .bind::<Text, _>(key.as_str())
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| map_write_error(&mut connection, &error))
}

fn records_table_exists(connection: &mut SqliteConnection) -> Result<bool, diesel::result::Error> {
    #[derive(Debug, QueryableByName)]
    struct Row {
        #[diesel(sql_type = BigInt)]
        one: i64,
    }

    let exists: Option<Row> = sql_query(
        "SELECT 1 AS one FROM sqlite_master WHERE type = 'table' AND name = ? LIMIT 1;",
    )
    .bind::<Text, _>(SIDEBAR_RECORDS_TABLE)
    .get_result(connection)
    .optional()?;

    Ok(exists.is_some_and(|row| row.one == 1))
}

fn map_error_with_schema_check<F>(
    connection: &mut SqliteConnection,
    error: &diesel::result::Error,
    create_error: F,
) -> PersistenceError
where
    F: Fn(String) -> PersistenceError,
{
    match records_table_exists(connection) {
        Ok(false) => PersistenceError::SchemaNotInitialised,
        Ok(true) => create_error(error.to_string()),
        Err(check_error) => create_error(format!(
            "schema presence check failed: {check_error}; original error: {error}"
        )),
    }
}

fn map_query_error(
    connection: &mut SqliteConnection,
    error: &diesel::result::Error,
) -> PersistenceError {
    map_error_with_schema_check(connection, error, |message| PersistenceError::QueryFailed {
        message,
    })
}

fn map_write_error(
    connection: &mut SqliteConnection,
    error: &diesel::result::Error,
) -> PersistenceError {
    map_error_with_schema_check(connection, error, |message| PersistenceError::WriteFailed {
        message,
    })
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn load(&self, key: RecordKey) -> Result<Option<Value>, PersistenceError> {
        self.run_blocking(move |database_url| load_record(database_url, key))
            .await
    }

    async fn save(&self, key: RecordKey, value: Value) -> Result<(), PersistenceError> {
        self.run_blocking(move |database_url| save_record(database_url, key, &value))
            .await
    }

    async fn delete(&self, key: RecordKey) -> Result<(), PersistenceError> {
        self.run_blocking(move |database_url| delete_record(database_url, key))
            .await
    }
}

#[cfg(test)]
mod tests;
