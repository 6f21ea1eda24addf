//! Tests for the `SQLite` record store.

type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

use rstest::{fixture, rstest};
use serde_json::json;
use tempfile::TempDir;

use super::SqliteRecordStore;
use crate::persistence::{PersistenceError, RecordKey, RecordStore, migrate_database};
use crate::telemetry::NoopTelemetrySink;

#[fixture]
fn temp_db() -> FixtureResult<(TempDir, String)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("forgebar.sqlite");
    Ok((temp_dir, db_path.to_string_lossy().to_string()))
}

#[fixture]
fn migrated_store(
    temp_db: FixtureResult<(TempDir, String)>,
) -> FixtureResult<(TempDir, SqliteRecordStore)> {
    let (temp_dir, database_url) = temp_db?;
    migrate_database(&database_url, &NoopTelemetrySink)?;

    let store = SqliteRecordStore::new(database_url)?;
    Ok((temp_dir, store))
}

#[rstest]
#[tokio::test]
async fn unwritten_record_loads_as_none(
    migrated_store: FixtureResult<(TempDir, SqliteRecordStore)>,
) {
    let (_temp_dir, store) = migrated_store.expect("fixture should succeed");

    let loaded = store
        .load(RecordKey::PinnedPullRequests)
        .await
        .expect("load should succeed");

    assert_eq!(loaded, None);
}

#[rstest]
#[tokio::test]
async fn save_replaces_previous_value(
    migrated_store: FixtureResult<(TempDir, SqliteRecordStore)>,
) {
    let (_temp_dir, store) = migrated_store.expect("fixture should succeed");

    store
        .save(RecordKey::PinnedPullRequests, json!({ "acme/widgets": [7] }))
        .await
        .expect("first save should succeed");
    store
        .save(
            RecordKey::PinnedPullRequests,
            json!({ "acme/widgets": [7, 42] }),
        )
        .await
        .expect("second save should succeed");

    let loaded = store
        .load(RecordKey::PinnedPullRequests)
        .await
        .expect("load should succeed");

    assert_eq!(loaded, Some(json!({ "acme/widgets": [7, 42] })));
}

#[rstest]
#[tokio::test]
async fn records_are_isolated_by_key(migrated_store: FixtureResult<(TempDir, SqliteRecordStore)>) {
    let (_temp_dir, store) = migrated_store.expect("fixture should succeed");

    store
        .save(RecordKey::TrackedRepos, json!(["acme/widgets"]))
        .await
        .expect("save should succeed");

    let pinned = store
        .load(RecordKey::PinnedIssues)
        .await
        .expect("load should succeed");

    assert_eq!(pinned, None);
}

#[rstest]
#[tokio::test]
async fn delete_removes_record(migrated_store: FixtureResult<(TempDir, SqliteRecordStore)>) {
    let (_temp_dir, store) = migrated_store.expect("fixture should succeed");
    store
        .save(RecordKey::Credential, json!("ghp_example"))
        .await
        .expect("save should succeed");

    store
        .delete(RecordKey::Credential)
        .await
        .expect("delete should succeed");
    store
        .delete(RecordKey::Credential)
        .await
        .expect("deleting twice should succeed");

    let loaded = store
        .load(RecordKey::Credential)
        .await
        .expect("load should succeed");
    assert_eq!(loaded, None);
}

#[rstest]
#[tokio::test]
async fn unmigrated_database_reports_missing_schema(temp_db: FixtureResult<(TempDir, String)>) {
    let (_temp_dir, database_url) = temp_db.expect("fixture should succeed");
    let store = SqliteRecordStore::new(database_url).expect("store should build");

    let error = store
        .load(RecordKey::TrackedRepos)
        .await
        .expect_err("unmigrated database should fail");

    assert_eq!(error, PersistenceError::SchemaNotInitialised);
}

#[rstest]
fn blank_database_url_is_rejected() {
    let result = SqliteRecordStore::new("  ");

    assert!(
        matches!(result, Err(PersistenceError::BlankDatabaseUrl)),
        "expected BlankDatabaseUrl, got {result:?}"
    );
}
