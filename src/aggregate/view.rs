//! View model produced by a sidebar refresh.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::github::{
    Issue, MergeableState, PullRequest, RepoKey, WorkflowDescriptor, WorkflowRun,
};

use super::ci::CiStatus;

/// Mergeability badge shown next to a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeBadge {
    /// The pull request is a draft.
    Draft,
    /// No conflicts and all requirements met.
    ReadyToMerge,
    /// Conflicts, branch protection or failing checks prevent merging.
    NotMergeable,
    /// The head branch is behind its base.
    UpdateBranch,
    /// GitHub is still computing mergeability.
    Checking,
    /// Any other state, shown verbatim.
    Other(String),
}

impl MergeBadge {
    /// Derives the badge for `pull_request`; the draft flag takes precedence
    /// over the mergeable state.
    #[must_use]
    pub fn for_pull_request(pull_request: &PullRequest) -> Self {
        if pull_request.draft {
            return Self::Draft;
        }
        match &pull_request.mergeable_state {
            MergeableState::Clean => Self::ReadyToMerge,
            MergeableState::Dirty | MergeableState::Blocked | MergeableState::Unstable => {
                Self::NotMergeable
            }
            MergeableState::Behind => Self::UpdateBranch,
            MergeableState::Unknown => Self::Checking,
            MergeableState::Draft => Self::Other("draft".to_owned()),
            MergeableState::HasHooks => Self::Other("has_hooks".to_owned()),
            MergeableState::Other(raw) => Self::Other(raw.clone()),
        }
    }

    /// Text shown on the badge.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Draft => "Draft",
            Self::ReadyToMerge => "Ready to merge",
            Self::NotMergeable => "Not mergeable",
            Self::UpdateBranch => "Update branch",
            Self::Checking => "Checking…",
            Self::Other(raw) => raw,
        }
    }
}

/// A pull request with its sidebar enrichments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestView {
    /// The pull request as fetched.
    pub pull_request: PullRequest,
    /// Unresolved review threads, absent when the count could not be fetched.
    pub unresolved_threads: Option<u32>,
    /// CI state, absent when there is no head commit or it could not be
    /// fetched.
    pub ci: Option<CiStatus>,
    /// New commits or comments since the pull request was last viewed.
    pub unread: bool,
    /// Mergeability badge.
    pub merge_badge: MergeBadge,
}

impl PullRequestView {
    /// Text of the unresolved-threads badge; only present for a positive
    /// count.
    #[must_use]
    pub fn unresolved_badge(&self) -> Option<String> {
        self.unresolved_threads
            .filter(|count| *count > 0)
            .map(|count| format!("{count} unresolved"))
    }
}

/// An issue with its unread flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueView {
    /// The issue as fetched.
    pub issue: Issue,
    /// New comments since the issue was last viewed.
    pub unread: bool,
}

/// A pinned workflow and its queued or running runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowView {
    /// The pinned workflow.
    pub workflow: WorkflowDescriptor,
    /// Active runs; empty when none exist or they could not be fetched.
    pub active_runs: Vec<WorkflowRun>,
}

/// Everything the sidebar shows for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoView {
    /// Open pull requests authored by the user.
    pub my_pull_requests: Vec<PullRequestView>,
    /// Pinned open pull requests authored by someone else.
    pub pinned_pull_requests: Vec<PullRequestView>,
    /// Other open pull requests requesting the user's review.
    pub review_pull_requests: Vec<PullRequestView>,
    /// Open issues opened by the user.
    pub my_issues: Vec<IssueView>,
    /// Pinned open issues opened by someone else.
    pub pinned_issues: Vec<IssueView>,
    /// Pinned workflows.
    pub workflows: Vec<WorkflowView>,
}

impl RepoView {
    /// Returns true when the repository has nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.my_pull_requests.is_empty()
            && self.pinned_pull_requests.is_empty()
            && self.review_pull_requests.is_empty()
            && self.my_issues.is_empty()
            && self.pinned_issues.is_empty()
            && self.workflows.is_empty()
    }

    /// Looks up a pull request shown in any section.
    #[must_use]
    pub fn pull_request(&self, number: u64) -> Option<&PullRequestView> {
        self.my_pull_requests
            .iter()
            .chain(&self.pinned_pull_requests)
            .chain(&self.review_pull_requests)
            .find(|view| view.pull_request.number == number)
    }
}

/// Result of a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SidebarView {
    /// No repository is tracked or pinned; nothing was fetched.
    Empty,
    /// Per-repository views.
    Repositories {
        /// Login of the authenticated user.
        login: String,
        /// Views keyed by repository.
        repositories: BTreeMap<RepoKey, RepoView>,
    },
}

impl SidebarView {
    /// View of `repo`, if it was refreshed.
    #[must_use]
    pub fn repository(&self, repo: &RepoKey) -> Option<&RepoView> {
        match self {
            Self::Empty => None,
            Self::Repositories { repositories, .. } => repositories.get(repo),
        }
    }
}
