//! Typed shapes of the persisted sidebar records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::github::{RepoKey, WorkflowDescriptor};

/// Identity under which a pinned item is de-duplicated.
pub trait PinIdentity {
    /// Returns the identifier compared between pins of one repository.
    fn pin_id(&self) -> u64;
}

impl PinIdentity for u64 {
    fn pin_id(&self) -> u64 {
        *self
    }
}

impl PinIdentity for WorkflowDescriptor {
    fn pin_id(&self) -> u64 {
        self.id
    }
}

/// Pinned items grouped by repository.
///
/// Serialises as `{"owner/repo": [item, ...]}`. Each list keeps insertion
/// order, holds no two items with the same [`PinIdentity::pin_id`], and is
/// never empty: a repository whose last pin is removed disappears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinnedSet<T> {
    entries: BTreeMap<RepoKey, Vec<T>>,
}

impl<T> Default for PinnedSet<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: PinIdentity> PinnedSet<T> {
    /// Adds `item` unless an item with the same identity is already pinned.
    ///
    /// Returns `true` when the set changed.
    pub fn insert(&mut self, repo: RepoKey, item: T) -> bool {
        let items = self.entries.entry(repo).or_default();
        if items.iter().any(|pinned| pinned.pin_id() == item.pin_id()) {
            return false;
        }
        items.push(item);
        true
    }

    /// Removes the item with identity `id`; returns `true` when one was
    /// removed.
    pub fn remove(&mut self, repo: &RepoKey, id: u64) -> bool {
        let Some(items) = self.entries.get_mut(repo) else {
            return false;
        };
        let before = items.len();
        items.retain(|pinned| pinned.pin_id() != id);
        let removed = items.len() != before;
        if items.is_empty() {
            self.entries.remove(repo);
        }
        removed
    }

    /// Returns true when `id` is pinned for `repo`.
    #[must_use]
    pub fn contains(&self, repo: &RepoKey, id: u64) -> bool {
        self.get(repo).iter().any(|pinned| pinned.pin_id() == id)
    }
}

impl<T> PinnedSet<T> {
    /// Pinned items of `repo`, in pin order.
    #[must_use]
    pub fn get(&self, repo: &RepoKey) -> &[T] {
        self.entries.get(repo).map_or(&[], Vec::as_slice)
    }

    /// Drops every pin of `repo`; returns `true` when any existed.
    pub fn remove_repo(&mut self, repo: &RepoKey) -> bool {
        self.entries.remove(repo).is_some()
    }

    /// Repositories with at least one pin, in key order.
    pub fn repos(&self) -> impl Iterator<Item = &RepoKey> {
        self.entries.keys()
    }

    /// Iterates over repositories and their pins.
    pub fn iter(&self) -> impl Iterator<Item = (&RepoKey, &[T])> {
        self.entries
            .iter()
            .map(|(repo, items)| (repo, items.as_slice()))
    }

    /// Returns true when nothing is pinned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// When each pull request or issue was last opened, per repository.
///
/// Serialises as `{"owner/repo": {"42": 1735689600000}}` with millisecond
/// Unix timestamps keyed by the item number as a decimal string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LastViewed {
    entries: BTreeMap<RepoKey, BTreeMap<String, i64>>,
}

impl LastViewed {
    /// Records that `number` was viewed at `viewed_at`, replacing any older
    /// entry.
    pub fn record(&mut self, repo: RepoKey, number: u64, viewed_at: DateTime<Utc>) {
        self.entries
            .entry(repo)
            .or_default()
            .insert(number.to_string(), viewed_at.timestamp_millis());
    }

    /// Last view time of `number`, or `None` when never recorded.
    #[must_use]
    pub fn viewed_at(&self, repo: &RepoKey, number: u64) -> Option<DateTime<Utc>> {
        self.entries
            .get(repo)
            .and_then(|numbers| numbers.get(&number.to_string()))
            .and_then(|millis| DateTime::from_timestamp_millis(*millis))
    }

    /// Returns true when no view has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
