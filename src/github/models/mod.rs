//! Data models for pull requests, issues, CI status and workflows.
//!
//! Public types are the domain view of GitHub data used by the aggregator.
//! Types prefixed with `Api` live in [`api`] and are internal
//! deserialisation targets that convert into these domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) mod api;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Open state of a pull request or issue.
///
/// GitHub reports `open`, `closed` and (for pull requests) merged; the
/// sidebar only distinguishes open items from everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// The item is open.
    Open,
    /// The item is closed or merged.
    NotOpen,
}

impl ItemState {
    /// Collapses a GitHub state string into open/not-open.
    #[must_use]
    pub fn from_api(state: Option<&str>) -> Self {
        match state {
            Some(value) if value.eq_ignore_ascii_case("open") => Self::Open,
            _ => Self::NotOpen,
        }
    }

    /// Returns true for [`ItemState::Open`].
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Mergeability of a pull request as computed by GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeableState {
    /// No conflicts and all requirements met.
    Clean,
    /// Merge conflicts with the base branch.
    Dirty,
    /// Blocked by branch protection.
    Blocked,
    /// Mergeable but with failing non-required checks.
    Unstable,
    /// Head branch is behind the base branch.
    Behind,
    /// GitHub has not finished computing mergeability.
    Unknown,
    /// Pull request is a draft.
    Draft,
    /// Mergeable with passing commit status and pre-receive hooks.
    HasHooks,
    /// Any state this client does not know about.
    Other(String),
}

impl MergeableState {
    /// Parses the `mergeable_state` field; a missing value is `Unknown`.
    #[must_use]
    pub fn from_api(state: Option<&str>) -> Self {
        let Some(raw) = state else {
            return Self::Unknown;
        };
        match raw.to_ascii_lowercase().as_str() {
            "clean" => Self::Clean,
            "dirty" => Self::Dirty,
            "blocked" => Self::Blocked,
            "unstable" => Self::Unstable,
            "behind" => Self::Behind,
            "unknown" | "" => Self::Unknown,
            "draft" => Self::Draft,
            "has_hooks" => Self::HasHooks,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Pull request as shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,
    /// Title of the pull request.
    pub title: String,
    /// Author login if present.
    pub author: Option<String>,
    /// Open or not open.
    pub state: ItemState,
    /// Whether the pull request is a draft.
    pub draft: bool,
    /// Mergeability reported by GitHub.
    pub mergeable_state: MergeableState,
    /// Added lines.
    pub additions: u64,
    /// Deleted lines.
    pub deletions: u64,
    /// SHA of the head commit.
    pub head_sha: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Logins of requested reviewers.
    pub requested_reviewers: Vec<String>,
    /// HTML URL for displaying to a user.
    pub html_url: Option<String>,
}

impl PullRequest {
    /// Returns true when `login` authored the pull request.
    #[must_use]
    pub fn is_authored_by(&self, login: &str) -> bool {
        self.author.as_deref() == Some(login)
    }

    /// Returns true when `login` is among the requested reviewers.
    #[must_use]
    pub fn requests_review_from(&self, login: &str) -> bool {
        self.requested_reviewers.iter().any(|reviewer| reviewer == login)
    }

    /// Overlays the single-PR detail onto a listing-derived record.
    ///
    /// The listing endpoint omits mergeability and line counts, so those come
    /// from `detail`. Requested reviewers are kept from the listing when the
    /// detail carries none.
    #[must_use]
    pub fn overlay(self, detail: Self) -> Self {
        let requested_reviewers = if detail.requested_reviewers.is_empty() {
            self.requested_reviewers
        } else {
            detail.requested_reviewers
        };
        Self {
            author: detail.author.or(self.author),
            head_sha: detail.head_sha.or(self.head_sha),
            created_at: detail.created_at.or(self.created_at),
            html_url: detail.html_url.or(self.html_url),
            requested_reviewers,
            ..detail
        }
    }
}

/// Issue as shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Author login if present.
    pub author: Option<String>,
    /// Open or not open.
    pub state: ItemState,
    /// Label names.
    pub labels: Vec<String>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// HTML URL for displaying to a user.
    pub html_url: Option<String>,
}

impl Issue {
    /// Returns true when `login` opened the issue.
    #[must_use]
    pub fn is_authored_by(&self, login: &str) -> bool {
        self.author.as_deref() == Some(login)
    }
}

/// A single check run attached to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    /// Check name.
    pub name: String,
    /// Execution status (`queued`, `in_progress`, `completed`).
    pub status: Option<String>,
    /// Conclusion once completed (`success`, `failure`, ...).
    pub conclusion: Option<String>,
}

/// Legacy combined commit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyStatus {
    /// Overall state (`success`, `pending`, `failure`, `error`).
    pub state: String,
}

/// Raw CI signals for a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    /// Legacy combined status, absent when it could not be fetched.
    pub legacy: Option<LegacyStatus>,
    /// Check runs; empty when none exist or they could not be fetched.
    pub check_runs: Vec<CheckRun>,
}

/// Which comment stream to inspect for activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentThread {
    /// Conversation comments (`/issues/{n}/comments`).
    Issue,
    /// Diff review comments (`/pulls/{n}/comments`).
    Review,
}

/// A workflow that can be pinned and dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDescriptor {
    /// Workflow identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Path of the workflow file in the repository.
    pub path: String,
}

/// An active (queued or in progress) workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Run identifier.
    pub id: u64,
    /// Run status.
    pub status: String,
    /// Sequential run number within the workflow.
    pub run_number: u64,
    /// HTML URL of the run.
    pub html_url: String,
    /// Login of the user that triggered the run.
    pub actor: String,
}
