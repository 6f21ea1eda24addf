//! Typed access to the sidebar records.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::github::{PersonalAccessToken, RepoKey, WorkflowDescriptor};

use super::PersistenceError;
use super::pins::{LastViewed, PinIdentity, PinnedSet};
use super::record_store::{RecordKey, RecordStore};

/// Typed facade over a [`RecordStore`].
///
/// Every mutation is a read-modify-write of a whole record. Mutations made
/// through one `SidebarStore` are serialised by an async mutex; a second
/// process writing the same database can still interleave with them.
pub struct SidebarStore {
    records: Arc<dyn RecordStore>,
    write_lock: Mutex<()>,
}

impl SidebarStore {
    /// Wraps `records`.
    #[must_use]
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self {
            records,
            write_lock: Mutex::new(()),
        }
    }

    async fn read<T>(&self, key: RecordKey) -> Result<T, PersistenceError>
    where
        T: DeserializeOwned + Default,
    {
        let Some(value) = self.records.load(key).await? else {
            return Ok(T::default());
        };
        if value.is_null() {
            return Ok(T::default());
        }
        serde_json::from_value(value).map_err(|error| PersistenceError::MalformedRecord {
            key: key.as_str().to_owned(),
            message: error.to_string(),
        })
    }

    async fn write<T: Serialize + Sync>(
        &self,
        key: RecordKey,
        record: &T,
    ) -> Result<(), PersistenceError> {
        let value =
            serde_json::to_value(record).map_err(|error| PersistenceError::MalformedRecord {
                key: key.as_str().to_owned(),
                message: error.to_string(),
            })?;
        self.records.save(key, value).await
    }

    /// Loads a record, applies `change`, and saves it when `change` reports a
    /// modification.
    async fn update<T, F>(&self, key: RecordKey, change: F) -> Result<bool, PersistenceError>
    where
        T: DeserializeOwned + Serialize + Default + Send + Sync,
        F: FnOnce(&mut T) -> bool + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut record: T = self.read(key).await?;
        let changed = change(&mut record);
        if changed {
            self.write(key, &record).await?;
        }
        Ok(changed)
    }

    async fn pin<T>(
        &self,
        key: RecordKey,
        repo: RepoKey,
        item: T,
    ) -> Result<bool, PersistenceError>
    where
        T: PinIdentity + DeserializeOwned + Serialize + Send + Sync,
    {
        self.update(key, |pins: &mut PinnedSet<T>| pins.insert(repo, item))
            .await
    }

    async fn unpin<T>(
        &self,
        key: RecordKey,
        repo: &RepoKey,
        id: u64,
    ) -> Result<bool, PersistenceError>
    where
        T: PinIdentity + DeserializeOwned + Serialize + Send + Sync,
    {
        self.update(key, |pins: &mut PinnedSet<T>| pins.remove(repo, id))
            .await
    }

    /// Stored personal access token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be read.
    pub async fn credential(&self) -> Result<Option<PersonalAccessToken>, PersistenceError> {
        let stored: Option<String> = self.read(RecordKey::Credential).await?;
        Ok(stored.and_then(|value| PersonalAccessToken::new(value).ok()))
    }

    /// Stores `token`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be written.
    pub async fn set_credential(
        &self,
        token: &PersonalAccessToken,
    ) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        self.write(RecordKey::Credential, &token.value()).await
    }

    /// Forgets the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be deleted.
    pub async fn clear_credential(&self) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        self.records.delete(RecordKey::Credential).await
    }

    /// Pinned pull request numbers.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be read or decoded.
    pub async fn pinned_pull_requests(&self) -> Result<PinnedSet<u64>, PersistenceError> {
        self.read(RecordKey::PinnedPullRequests).await
    }

    /// Pins a pull request; returns `false` when it was already pinned.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be updated.
    pub async fn pin_pull_request(
        &self,
        repo: RepoKey,
        number: u64,
    ) -> Result<bool, PersistenceError> {
        self.pin(RecordKey::PinnedPullRequests, repo, number).await
    }

    /// Unpins a pull request; returns `false` when it was not pinned.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be updated.
    pub async fn unpin_pull_request(
        &self,
        repo: &RepoKey,
        number: u64,
    ) -> Result<bool, PersistenceError> {
        self.unpin::<u64>(RecordKey::PinnedPullRequests, repo, number)
            .await
    }

    /// Pinned issue numbers.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be read or decoded.
    pub async fn pinned_issues(&self) -> Result<PinnedSet<u64>, PersistenceError> {
        self.read(RecordKey::PinnedIssues).await
    }

    /// Pins an issue; returns `false` when it was already pinned.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be updated.
    pub async fn pin_issue(&self, repo: RepoKey, number: u64) -> Result<bool, PersistenceError> {
        self.pin(RecordKey::PinnedIssues, repo, number).await
    }

    /// Unpins an issue; returns `false` when it was not pinned.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be updated.
    pub async fn unpin_issue(&self, repo: &RepoKey, number: u64) -> Result<bool, PersistenceError> {
        self.unpin::<u64>(RecordKey::PinnedIssues, repo, number)
            .await
    }

    /// Pinned workflows.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be read or decoded.
    pub async fn pinned_workflows(
        &self,
    ) -> Result<PinnedSet<WorkflowDescriptor>, PersistenceError> {
        self.read(RecordKey::PinnedWorkflows).await
    }

    /// Pins a workflow; returns `false` when its id was already pinned.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be updated.
    pub async fn pin_workflow(
        &self,
        repo: RepoKey,
        workflow: WorkflowDescriptor,
    ) -> Result<bool, PersistenceError> {
        self.pin(RecordKey::PinnedWorkflows, repo, workflow).await
    }

    /// Unpins a workflow by id; returns `false` when it was not pinned.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be updated.
    pub async fn unpin_workflow(
        &self,
        repo: &RepoKey,
        workflow_id: u64,
    ) -> Result<bool, PersistenceError> {
        self.unpin::<WorkflowDescriptor>(RecordKey::PinnedWorkflows, repo, workflow_id)
            .await
    }

    /// Explicitly tracked repositories, in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be read or decoded.
    pub async fn tracked_repos(&self) -> Result<Vec<RepoKey>, PersistenceError> {
        self.read(RecordKey::TrackedRepos).await
    }

    /// Tracks `repo`; returns `false` when it was already tracked.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be updated.
    pub async fn track_repo(&self, repo: RepoKey) -> Result<bool, PersistenceError> {
        self.update(RecordKey::TrackedRepos, |tracked: &mut Vec<RepoKey>| {
            if tracked.contains(&repo) {
                return false;
            }
            tracked.push(repo);
            true
        })
        .await
    }

    /// Stops tracking `repo` and drops all of its pinned pull requests,
    /// issues and workflows.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when any of the records cannot be
    /// updated. Records already rewritten stay rewritten.
    pub async fn remove_repo(&self, repo: &RepoKey) -> Result<(), PersistenceError> {
        self.update(RecordKey::TrackedRepos, |tracked: &mut Vec<RepoKey>| {
            let before = tracked.len();
            tracked.retain(|candidate| candidate != repo);
            tracked.len() != before
        })
        .await?;
        self.update(RecordKey::PinnedPullRequests, |pins: &mut PinnedSet<u64>| {
            pins.remove_repo(repo)
        })
        .await?;
        self.update(RecordKey::PinnedIssues, |pins: &mut PinnedSet<u64>| {
            pins.remove_repo(repo)
        })
        .await?;
        self.update(
            RecordKey::PinnedWorkflows,
            |pins: &mut PinnedSet<WorkflowDescriptor>| pins.remove_repo(repo),
        )
        .await?;
        Ok(())
    }

    /// Union of tracked repositories and every repository with a pin,
    /// sorted.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when any record cannot be read.
    pub async fn repo_set(&self) -> Result<BTreeSet<RepoKey>, PersistenceError> {
        let mut repos: BTreeSet<RepoKey> = self.tracked_repos().await?.into_iter().collect();
        repos.extend(self.pinned_pull_requests().await?.repos().cloned());
        repos.extend(self.pinned_issues().await?.repos().cloned());
        repos.extend(self.pinned_workflows().await?.repos().cloned());
        Ok(repos)
    }

    /// Records that a pull request was opened at `viewed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be updated.
    pub async fn record_viewed_pull_request(
        &self,
        repo: RepoKey,
        number: u64,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        self.update(
            RecordKey::LastViewedPullRequests,
            |last_viewed: &mut LastViewed| {
                last_viewed.record(repo, number, viewed_at);
                true
            },
        )
        .await
        .map(drop)
    }

    /// Records that an issue was opened at `viewed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be updated.
    pub async fn record_viewed_issue(
        &self,
        repo: RepoKey,
        number: u64,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        self.update(RecordKey::LastViewedIssues, |last_viewed: &mut LastViewed| {
            last_viewed.record(repo, number, viewed_at);
            true
        })
        .await
        .map(drop)
    }

    /// Last-viewed times of pull requests.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be read or decoded.
    pub async fn last_viewed_pull_requests(&self) -> Result<LastViewed, PersistenceError> {
        self.read(RecordKey::LastViewedPullRequests).await
    }

    /// Last-viewed times of issues.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be read or decoded.
    pub async fn last_viewed_issues(&self) -> Result<LastViewed, PersistenceError> {
        self.read(RecordKey::LastViewedIssues).await
    }
}
