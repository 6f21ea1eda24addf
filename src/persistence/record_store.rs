//! Key-value record storage for sidebar state.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::PersistenceError;

/// Keys of the records the sidebar persists.
///
/// The string forms match the keys the browser extension keeps in its
/// storage area, so exported state can be imported unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKey {
    /// Personal access token.
    Credential,
    /// Pinned pull request numbers per repository.
    PinnedPullRequests,
    /// Pinned issue numbers per repository.
    PinnedIssues,
    /// Pinned workflow descriptors per repository.
    PinnedWorkflows,
    /// Explicitly tracked repositories.
    TrackedRepos,
    /// Last time each pull request was viewed.
    LastViewedPullRequests,
    /// Last time each issue was viewed.
    LastViewedIssues,
}

impl RecordKey {
    /// Storage key string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credential => "githubToken",
            Self::PinnedPullRequests => "pinnedPRs",
            Self::PinnedIssues => "pinnedIssues",
            Self::PinnedWorkflows => "pinnedWorkflows",
            Self::TrackedRepos => "trackedRepos",
            Self::LastViewedPullRequests => "lastViewedPR",
            Self::LastViewedIssues => "lastViewedIssue",
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Whole-record get/set storage.
///
/// Each call reads or replaces one record atomically. Sequences of calls are
/// not atomic; [`super::SidebarStore`] serialises its own read-modify-write
/// cycles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Loads a record, returning `None` when it has never been written.
    async fn load(&self, key: RecordKey) -> Result<Option<Value>, PersistenceError>;

    /// Replaces a record.
    async fn save(&self, key: RecordKey, value: Value) -> Result<(), PersistenceError>;

    /// Deletes a record; deleting a missing record succeeds.
    async fn delete(&self, key: RecordKey) -> Result<(), PersistenceError>;
}

/// In-memory [`RecordStore`] for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<RecordKey, Value>>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = (RecordKey, Value)>) -> Self {
        Self {
            records: Mutex::new(records.into_iter().collect()),
        }
    }

    /// Copy of a record, bypassing the async interface.
    #[must_use]
    pub fn snapshot(&self, key: RecordKey) -> Option<Value> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load(&self, key: RecordKey) -> Result<Option<Value>, PersistenceError> {
        Ok(self.snapshot(key))
    }

    async fn save(&self, key: RecordKey, value: Value) -> Result<(), PersistenceError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
        Ok(())
    }

    async fn delete(&self, key: RecordKey) -> Result<(), PersistenceError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        Ok(())
    }
}
