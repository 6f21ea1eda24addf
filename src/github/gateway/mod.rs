//! Gateways for talking to the GitHub REST and GraphQL APIs.
//!
//! [`ForgeGateway`] is the seam between the aggregator and GitHub. The
//! Octocrab implementation handles real HTTP requests; tests substitute the
//! generated `MockForgeGateway` or point the Octocrab gateway at a `wiremock`
//! server.

mod client;
mod error_mapping;
mod forge;
mod http_utils;
mod provider;
mod pulls;
mod workflows;


pub use forge::OctocrabForgeGateway;
pub use provider::{GatewayProvider, OctocrabGatewayProvider};

#[cfg(test)]
pub use provider::MockGatewayProvider;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::github::error::ForgeError;
use crate::github::models::{
    CommentThread, CommitStatus, Issue, PullRequest, WorkflowDescriptor, WorkflowRun,
};
use crate::github::repo_key::RepoKey;

/// Maximum page size GitHub accepts; only the first page is ever fetched.
pub const PAGE_SIZE: u8 = 100;

/// Remote operations the sidebar needs from GitHub.
///
/// Every call is an idempotent read except [`ForgeGateway::dispatch_workflow`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForgeGateway: Send + Sync {
    /// Login of the user owning the token.
    async fn authenticated_login(&self) -> Result<String, ForgeError>;

    /// Open pull requests of the repository (first page).
    async fn list_open_pull_requests(&self, repo: &RepoKey)
    -> Result<Vec<PullRequest>, ForgeError>;

    /// Open issues of the repository, excluding pull requests.
    async fn list_open_issues(&self, repo: &RepoKey) -> Result<Vec<Issue>, ForgeError>;

    /// A single pull request including mergeability and line counts.
    async fn pull_request(&self, repo: &RepoKey, number: u64) -> Result<PullRequest, ForgeError>;

    /// A single issue.
    async fn issue(&self, repo: &RepoKey, number: u64) -> Result<Issue, ForgeError>;

    /// Legacy combined status and check runs for a commit.
    async fn commit_status(&self, repo: &RepoKey, git_ref: &str)
    -> Result<CommitStatus, ForgeError>;

    /// Committer date of a commit.
    async fn commit_timestamp(
        &self,
        repo: &RepoKey,
        sha: &str,
    ) -> Result<Option<DateTime<Utc>>, ForgeError>;

    /// Timestamp of the most recently updated comment in a thread.
    async fn latest_comment_at(
        &self,
        repo: &RepoKey,
        number: u64,
        thread: CommentThread,
    ) -> Result<Option<DateTime<Utc>>, ForgeError>;

    /// Unresolved review threads among the first 100 threads of a PR.
    async fn unresolved_review_thread_count(
        &self,
        repo: &RepoKey,
        number: u64,
    ) -> Result<u32, ForgeError>;

    /// Workflows in the `active` state.
    async fn list_active_workflows(
        &self,
        repo: &RepoKey,
    ) -> Result<Vec<WorkflowDescriptor>, ForgeError>;

    /// Queued and in-progress runs of one workflow.
    async fn list_active_workflow_runs(
        &self,
        repo: &RepoKey,
        workflow_id: u64,
    ) -> Result<Vec<WorkflowRun>, ForgeError>;

    /// Triggers a `workflow_dispatch` run.
    async fn dispatch_workflow(
        &self,
        repo: &RepoKey,
        workflow_id: u64,
        git_ref: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<(), ForgeError>;

    /// Decoded contents of a file in the default branch.
    async fn workflow_file_contents(&self, repo: &RepoKey, path: &str)
    -> Result<String, ForgeError>;
}
