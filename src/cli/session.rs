//! Opening the sidebar store and command dispatcher.

use std::sync::Arc;

use forgebar::persistence::{SqliteRecordStore, migrate_database};
use forgebar::telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink};
use forgebar::{
    CommandDispatcher, ForgeError, ForgebarConfig, OctocrabGatewayProvider, PersonalAccessToken,
    SidebarStore,
};

use super::migrations::map_persistence_error;

/// Selects the telemetry sink for the configuration.
#[must_use]
pub fn telemetry_sink(config: &ForgebarConfig) -> Arc<dyn TelemetrySink> {
    if config.telemetry {
        Arc::new(StderrJsonlTelemetrySink)
    } else {
        Arc::new(NoopTelemetrySink)
    }
}

/// Migrates the database, opens the store, and builds a dispatcher.
///
/// A token supplied through configuration replaces the stored credential.
///
/// # Errors
///
/// Returns [`ForgeError::Configuration`] for a blank database URL or token
/// and [`ForgeError::Storage`] when the database cannot be prepared.
pub async fn open(
    config: &ForgebarConfig,
    telemetry: Arc<dyn TelemetrySink>,
) -> Result<CommandDispatcher, ForgeError> {
    migrate_database(&config.database_url, telemetry.as_ref())
        .map_err(|error| map_persistence_error(&error))?;
    let records = SqliteRecordStore::new(config.database_url.as_str())
        .map_err(|error| map_persistence_error(&error))?;
    let store = SidebarStore::new(Arc::new(records));

    if let Some(token_value) = config.resolve_token() {
        let token = PersonalAccessToken::new(token_value)?;
        store.set_credential(&token).await?;
        tracing::debug!("stored credential from configuration");
    }

    let provider = OctocrabGatewayProvider::new(config.api_base.as_str());
    Ok(CommandDispatcher::new(
        Arc::new(store),
        Arc::new(provider),
        telemetry,
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use forgebar::telemetry::NoopTelemetrySink;
    use forgebar::{Command, ForgebarConfig, Response};
    use rstest::rstest;

    use super::open;

    #[rstest]
    #[tokio::test]
    async fn configured_token_is_stored() {
        let directory = tempfile::tempdir().expect("temporary directory");
        let config = ForgebarConfig {
            token: Some("ghp_example".to_owned()),
            database_url: directory
                .path()
                .join("forgebar.sqlite")
                .to_string_lossy()
                .into_owned(),
            ..Default::default()
        };

        let dispatcher = open(&config, Arc::new(NoopTelemetrySink))
            .await
            .expect("session should open");
        let presence = dispatcher
            .dispatch(Command::GetCredentialPresence)
            .await
            .expect("presence");

        assert_eq!(presence, Response::CredentialPresence(true));
    }

    #[rstest]
    #[tokio::test]
    async fn tracked_repositories_survive_reopening() {
        let directory = tempfile::tempdir().expect("temporary directory");
        let config = ForgebarConfig {
            database_url: directory
                .path()
                .join("forgebar.sqlite")
                .to_string_lossy()
                .into_owned(),
            ..Default::default()
        };
        let track: Command = serde_json::from_str(r#"{"type":"track_repo","repo":"acme/widgets"}"#)
            .expect("valid command");

        let first = open(&config, Arc::new(NoopTelemetrySink))
            .await
            .expect("first session");
        first.dispatch(track).await.expect("track");
        let second = open(&config, Arc::new(NoopTelemetrySink))
            .await
            .expect("second session");
        let tracked = second
            .dispatch(Command::GetTrackedRepos)
            .await
            .expect("tracked repos");

        let Response::TrackedRepos(repos) = tracked else {
            panic!("expected tracked repos, got {tracked:?}");
        };
        let names: Vec<String> = repos.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["acme/widgets"]);
    }
}
