//! Shared test utilities.

use std::sync::Arc;

use forgebar::persistence::{SqliteRecordStore, migrate_database};
use forgebar::telemetry::test_support::RecordingSink;
use forgebar::{
    Command, CommandDispatcher, OctocrabGatewayProvider, PersonalAccessToken, Response,
    SidebarStore,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a temporary directory for database tests.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
pub fn create_temp_dir() -> TempDir {
    TempDir::new().unwrap_or_else(|error| panic!("failed to create temporary directory: {error}"))
}

/// Path of the sidebar database inside `temp_dir`.
pub fn create_database_path(temp_dir: &TempDir) -> String {
    temp_dir
        .path()
        .join("forgebar.sqlite")
        .to_string_lossy()
        .into_owned()
}

/// A dispatcher wired to a migrated `SQLite` store and a mock GitHub server.
pub struct Sidebar {
    /// Mock GitHub API.
    pub server: MockServer,
    /// Dispatcher under test.
    pub dispatcher: CommandDispatcher,
    /// Telemetry recorded by the dispatcher.
    pub telemetry: Arc<RecordingSink>,
    _database_dir: TempDir,
}

impl Sidebar {
    /// Starts the mock server, migrates a fresh database, and stores the
    /// token `valid-token`.
    ///
    /// # Panics
    ///
    /// Panics if any part of the setup fails.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let database_dir = create_temp_dir();
        let database_url = create_database_path(&database_dir);
        let telemetry = Arc::new(RecordingSink::default());
        migrate_database(&database_url, telemetry.as_ref())
            .unwrap_or_else(|error| panic!("migrations failed: {error}"));
        let records = SqliteRecordStore::new(database_url)
            .unwrap_or_else(|error| panic!("store failed: {error}"));
        let store = SidebarStore::new(Arc::new(records));
        let token = PersonalAccessToken::new("valid-token")
            .unwrap_or_else(|error| panic!("token rejected: {error}"));
        store
            .set_credential(&token)
            .await
            .unwrap_or_else(|error| panic!("credential not stored: {error}"));
        let provider = OctocrabGatewayProvider::new(format!("{}/", server.uri()));
        let dispatcher =
            CommandDispatcher::new(Arc::new(store), Arc::new(provider), telemetry.clone());
        let _schema_event = telemetry.take();

        Self {
            server,
            dispatcher,
            telemetry,
            _database_dir: database_dir,
        }
    }

    /// Parses and dispatches a JSON command.
    ///
    /// # Panics
    ///
    /// Panics if the command is malformed or fails.
    pub async fn send(&self, command: Value) -> Response {
        let parsed: Command = serde_json::from_value(command)
            .unwrap_or_else(|error| panic!("malformed command: {error}"));
        self.dispatcher
            .dispatch(parsed)
            .await
            .unwrap_or_else(|error| panic!("command failed: {error}"))
    }

    /// Serves `body` for GET requests to `route`.
    pub async fn mount_get(&self, route: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}

/// A pull request as returned by the REST API.
pub fn pull_json(number: u64, author: &str, state: &str) -> Value {
    json!({
        "number": number,
        "title": format!("Change #{number}"),
        "state": state,
        "draft": false,
        "mergeable_state": "clean",
        "additions": 10,
        "deletions": 2,
        "head": { "sha": format!("sha-{number}") },
        "user": { "login": author },
        "created_at": "2026-01-01T00:00:00Z",
        "requested_reviewers": [],
        "html_url": format!("https://github.com/acme/widgets/pull/{number}")
    })
}
