//! Request/response command surface.
//!
//! Every interaction a presentation layer has with the sidebar core is a
//! [`Command`] answered by [`CommandDispatcher::dispatch`] with a
//! [`Response`]. Commands serialise as JSON objects tagged by `type`:
//!
//! ```
//! use forgebar::command::Command;
//!
//! let command: Command =
//!     serde_json::from_str(r#"{"type":"pin_pull_request","repo":"acme/widgets","number":42}"#)
//!         .expect("valid command");
//! assert!(matches!(command, Command::PinPullRequest { number: 42, .. }));
//! ```

mod dispatcher;


pub use dispatcher::CommandDispatcher;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{CiStatus, PullRequestActivity, SidebarView, WorkflowView};
use crate::github::{
    CommitStatus, Issue, PullRequest, RepoKey, WorkflowDescriptor, WorkflowRun,
};
use crate::persistence::{LastViewed, PinnedSet};
use crate::workflow::WorkflowInputSpec;

/// Git ref dispatched when a command names none.
pub const DEFAULT_DISPATCH_REF: &str = "main";

fn default_dispatch_ref() -> String {
    DEFAULT_DISPATCH_REF.to_owned()
}

/// Value of a `workflow_dispatch` input as supplied by a form.
///
/// GitHub only accepts strings, so every variant is sent as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    /// A checkbox value.
    Flag(bool),
    /// A numeric value.
    Number(serde_json::Number),
    /// Free text.
    Text(String),
}

impl InputValue {
    /// The value as GitHub expects it.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Flag(flag) => flag.to_string(),
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text,
        }
    }
}

/// A request from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Whether a token is stored.
    GetCredentialPresence,
    /// Stores a personal access token.
    SetCredential {
        /// Token value; surrounding whitespace is ignored.
        token: String,
    },
    /// Forgets the stored token.
    ClearCredential,
    /// Login of the token's owner.
    GetAuthenticatedLogin,
    /// Open pull requests authored by the user.
    ListMyOpenPullRequests {
        /// Repository to list.
        repo: RepoKey,
    },
    /// Open pull requests requesting the user's review.
    ListReviewRequestedPullRequests {
        /// Repository to list.
        repo: RepoKey,
    },
    /// Open issues opened by the user.
    ListMyOpenIssues {
        /// Repository to list.
        repo: RepoKey,
    },
    /// A single pull request.
    GetPullRequest {
        /// Repository of the pull request.
        repo: RepoKey,
        /// Pull request number.
        number: u64,
    },
    /// A single issue.
    GetIssue {
        /// Repository of the issue.
        repo: RepoKey,
        /// Issue number.
        number: u64,
    },
    /// Raw CI signals and their classification for a commit.
    GetCommitStatus {
        /// Repository of the commit.
        repo: RepoKey,
        /// Commit SHA or ref.
        #[serde(rename = "ref")]
        git_ref: String,
    },
    /// Unresolved review threads of a pull request.
    GetUnresolvedCount {
        /// Repository of the pull request.
        repo: RepoKey,
        /// Pull request number.
        number: u64,
    },
    /// Latest commit and comment times of a pull request.
    GetPullRequestActivity {
        /// Repository of the pull request.
        repo: RepoKey,
        /// Pull request number.
        number: u64,
        /// Head commit; the commit time is omitted without it.
        #[serde(default)]
        head_sha: Option<String>,
    },
    /// Latest comment time of an issue.
    GetIssueActivity {
        /// Repository of the issue.
        repo: RepoKey,
        /// Issue number.
        number: u64,
    },
    /// Active workflows of a repository.
    ListWorkflows {
        /// Repository to list.
        repo: RepoKey,
    },
    /// Text of a workflow file.
    GetWorkflowFile {
        /// Repository holding the file.
        repo: RepoKey,
        /// File path within the repository.
        path: String,
    },
    /// `workflow_dispatch` inputs declared by a workflow file.
    GetWorkflowInputs {
        /// Repository holding the file.
        repo: RepoKey,
        /// File path within the repository.
        path: String,
    },
    /// Triggers a `workflow_dispatch` run.
    DispatchWorkflow {
        /// Repository of the workflow.
        repo: RepoKey,
        /// Workflow identifier.
        workflow_id: u64,
        /// Git ref to run on, `main` by default.
        #[serde(rename = "ref", default = "default_dispatch_ref")]
        git_ref: String,
        /// Input values by name.
        #[serde(default)]
        inputs: BTreeMap<String, InputValue>,
    },
    /// Queued and in-progress runs of a workflow.
    ListWorkflowRuns {
        /// Repository of the workflow.
        repo: RepoKey,
        /// Workflow identifier.
        workflow_id: u64,
    },
    /// Every pinned pull request.
    GetPinnedPullRequests,
    /// Pins a pull request.
    PinPullRequest {
        /// Repository of the pull request.
        repo: RepoKey,
        /// Pull request number.
        number: u64,
    },
    /// Unpins a pull request.
    UnpinPullRequest {
        /// Repository of the pull request.
        repo: RepoKey,
        /// Pull request number.
        number: u64,
    },
    /// Every pinned issue.
    GetPinnedIssues,
    /// Pins an issue.
    PinIssue {
        /// Repository of the issue.
        repo: RepoKey,
        /// Issue number.
        number: u64,
    },
    /// Unpins an issue.
    UnpinIssue {
        /// Repository of the issue.
        repo: RepoKey,
        /// Issue number.
        number: u64,
    },
    /// Every pinned workflow.
    GetPinnedWorkflows,
    /// Pins a known workflow.
    PinWorkflow {
        /// Repository of the workflow.
        repo: RepoKey,
        /// Workflow to pin.
        workflow: WorkflowDescriptor,
    },
    /// Pins the active workflow a path or slug refers to.
    PinWorkflowByPath {
        /// Repository of the workflow.
        repo: RepoKey,
        /// File path, file name or name slug.
        path: String,
    },
    /// Unpins a workflow.
    UnpinWorkflow {
        /// Repository of the workflow.
        repo: RepoKey,
        /// Workflow identifier.
        workflow_id: u64,
    },
    /// Explicitly tracked repositories.
    GetTrackedRepos,
    /// Tracks a repository.
    TrackRepo {
        /// Repository to track.
        repo: RepoKey,
    },
    /// Stops tracking a repository and drops its pins.
    RemoveRepo {
        /// Repository to remove.
        repo: RepoKey,
    },
    /// Records that a pull request was opened.
    RecordViewedPullRequest {
        /// Repository of the pull request.
        repo: RepoKey,
        /// Pull request number.
        number: u64,
        /// View time; now when omitted.
        #[serde(default)]
        viewed_at: Option<DateTime<Utc>>,
    },
    /// Records that an issue was opened.
    RecordViewedIssue {
        /// Repository of the issue.
        repo: RepoKey,
        /// Issue number.
        number: u64,
        /// View time; now when omitted.
        #[serde(default)]
        viewed_at: Option<DateTime<Utc>>,
    },
    /// Last-viewed times of pull requests.
    GetLastViewedPullRequests,
    /// Last-viewed times of issues.
    GetLastViewedIssues,
    /// Runs a full sidebar refresh.
    Refresh,
    /// Refetches the active runs of pinned workflows.
    RefreshWorkflowRuns,
}

/// The answer to a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Response {
    /// Whether a token is stored.
    CredentialPresence(bool),
    /// Authenticated login.
    Login(String),
    /// A list of pull requests.
    PullRequests(Vec<PullRequest>),
    /// A single pull request.
    PullRequest(PullRequest),
    /// A list of issues.
    Issues(Vec<Issue>),
    /// A single issue.
    Issue(Issue),
    /// CI signals of a commit.
    CommitStatus {
        /// Raw signals.
        status: CommitStatus,
        /// Classification of `status`.
        ci: CiStatus,
    },
    /// Unresolved review thread count.
    UnresolvedCount(u32),
    /// Pull request activity.
    PullRequestActivity(PullRequestActivity),
    /// Latest issue comment time.
    IssueActivity(Option<DateTime<Utc>>),
    /// Workflows.
    Workflows(Vec<WorkflowDescriptor>),
    /// Workflow file text.
    WorkflowFile(String),
    /// Declared dispatch inputs.
    WorkflowInputs(Vec<WorkflowInputSpec>),
    /// Active workflow runs.
    WorkflowRuns(Vec<WorkflowRun>),
    /// Pinned pull request or issue numbers.
    PinnedNumbers(PinnedSet<u64>),
    /// Pinned workflows.
    PinnedWorkflows(PinnedSet<WorkflowDescriptor>),
    /// The workflow a path resolved to, now pinned.
    PinnedWorkflow(WorkflowDescriptor),
    /// Whether a pin or track command changed the store.
    Changed(bool),
    /// Tracked repositories.
    TrackedRepos(Vec<RepoKey>),
    /// Last-viewed times.
    LastViewed(LastViewed),
    /// Result of a full refresh.
    Sidebar(SidebarView),
    /// Result of a workflow-run refresh.
    WorkflowViews(BTreeMap<RepoKey, Vec<WorkflowView>>),
    /// The command completed without a result.
    Done,
}
