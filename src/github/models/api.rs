//! Deserialisation targets for GitHub REST and GraphQL payloads.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{
    CheckRun, Issue, ItemState, LegacyStatus, MergeableState, PullRequest, WorkflowDescriptor,
    WorkflowRun,
};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiUser {
    pub(crate) login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiHead {
    pub(crate) sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub(crate) number: u64,
    pub(crate) title: Option<String>,
    pub(crate) state: Option<String>,
    #[serde(default)]
    pub(crate) draft: Option<bool>,
    #[serde(default)]
    pub(crate) mergeable_state: Option<String>,
    #[serde(default)]
    pub(crate) additions: Option<u64>,
    #[serde(default)]
    pub(crate) deletions: Option<u64>,
    pub(crate) head: Option<ApiHead>,
    pub(crate) user: Option<ApiUser>,
    pub(crate) created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) requested_reviewers: Option<Vec<ApiUser>>,
    pub(crate) html_url: Option<String>,
}

impl ApiPullRequest {
    /// Converts into the domain type, substituting line counts that the
    /// payload omitted.
    pub(crate) fn into_pull_request(
        self,
        fallback_additions: u64,
        fallback_deletions: u64,
    ) -> PullRequest {
        PullRequest {
            number: self.number,
            title: self.title.unwrap_or_default(),
            author: self.user.and_then(|user| user.login),
            state: ItemState::from_api(self.state.as_deref()),
            draft: self.draft.unwrap_or(false),
            mergeable_state: MergeableState::from_api(self.mergeable_state.as_deref()),
            additions: self.additions.unwrap_or(fallback_additions),
            deletions: self.deletions.unwrap_or(fallback_deletions),
            head_sha: self.head.and_then(|head| head.sha),
            created_at: self.created_at,
            requested_reviewers: self
                .requested_reviewers
                .unwrap_or_default()
                .into_iter()
                .filter_map(|reviewer| reviewer.login)
                .collect(),
            html_url: self.html_url,
        }
    }

    pub(crate) const fn lacks_line_counts(&self) -> bool {
        self.additions.is_none() || self.deletions.is_none()
    }
}

impl From<ApiPullRequest> for PullRequest {
    fn from(value: ApiPullRequest) -> Self {
        value.into_pull_request(0, 0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiPullRequestFile {
    #[serde(default)]
    pub(crate) additions: Option<u64>,
    #[serde(default)]
    pub(crate) deletions: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiLabel {
    pub(crate) name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiIssue {
    pub(crate) number: u64,
    pub(crate) title: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) user: Option<ApiUser>,
    #[serde(default)]
    pub(crate) labels: Vec<ApiLabel>,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) html_url: Option<String>,
    #[serde(default)]
    pub(crate) pull_request: Option<serde_json::Value>,
}

impl ApiIssue {
    pub(crate) const fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

impl From<ApiIssue> for Issue {
    fn from(value: ApiIssue) -> Self {
        Self {
            number: value.number,
            title: value.title.unwrap_or_default(),
            author: value.user.and_then(|user| user.login),
            state: ItemState::from_api(value.state.as_deref()),
            labels: value
                .labels
                .into_iter()
                .filter_map(|label| label.name)
                .collect(),
            created_at: value.created_at,
            html_url: value.html_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiAuthenticatedUser {
    pub(crate) login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCombinedStatus {
    pub(crate) state: String,
}

impl From<ApiCombinedStatus> for LegacyStatus {
    fn from(value: ApiCombinedStatus) -> Self {
        Self { state: value.state }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCheckRun {
    pub(crate) name: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) conclusion: Option<String>,
}

impl From<ApiCheckRun> for CheckRun {
    fn from(value: ApiCheckRun) -> Self {
        Self {
            name: value.name.unwrap_or_default(),
            status: value.status,
            conclusion: value.conclusion,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiCheckRuns {
    #[serde(default)]
    pub(crate) check_runs: Vec<ApiCheckRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommitSignature {
    pub(crate) date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommitDetail {
    pub(crate) committer: Option<ApiCommitSignature>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommit {
    pub(crate) commit: Option<ApiCommitDetail>,
}

impl ApiCommit {
    pub(crate) fn committed_at(self) -> Option<DateTime<Utc>> {
        self.commit
            .and_then(|detail| detail.committer)
            .and_then(|committer| committer.date)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommentTimestamps {
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

impl ApiCommentTimestamps {
    pub(crate) fn latest(self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiWorkflow {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) state: String,
}

impl ApiWorkflow {
    pub(crate) fn is_active(&self) -> bool {
        self.state == "active"
    }
}

impl From<ApiWorkflow> for WorkflowDescriptor {
    fn from(value: ApiWorkflow) -> Self {
        Self {
            id: value.id,
            name: value.name,
            path: value.path,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiWorkflows {
    #[serde(default)]
    pub(crate) workflows: Vec<ApiWorkflow>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiWorkflowRun {
    pub(crate) id: u64,
    pub(crate) workflow_id: u64,
    pub(crate) status: Option<String>,
    pub(crate) run_number: u64,
    pub(crate) html_url: String,
    pub(crate) actor: Option<ApiUser>,
    pub(crate) triggering_actor: Option<ApiUser>,
}

impl From<ApiWorkflowRun> for WorkflowRun {
    fn from(value: ApiWorkflowRun) -> Self {
        let actor = value
            .triggering_actor
            .and_then(|user| user.login)
            .or_else(|| value.actor.and_then(|user| user.login))
            .unwrap_or_else(|| "Unknown".to_owned());
        Self {
            id: value.id,
            status: value.status.unwrap_or_default(),
            run_number: value.run_number,
            html_url: value.html_url,
            actor,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiWorkflowRuns {
    #[serde(default)]
    pub(crate) workflow_runs: Vec<ApiWorkflowRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiContent {
    pub(crate) content: Option<String>,
}

// --- GraphQL ---

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GraphQlEnvelope<T> {
    pub(crate) data: Option<T>,
    #[serde(default)]
    pub(crate) errors: Option<Vec<GraphQlErrorMessage>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GraphQlErrorMessage {
    pub(crate) message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReviewThreadsData {
    pub(crate) repository: Option<ReviewThreadsRepository>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewThreadsRepository {
    pub(crate) pull_request: Option<ReviewThreadsPullRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewThreadsPullRequest {
    pub(crate) review_threads: Option<ReviewThreadConnection>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewThreadConnection {
    #[serde(default)]
    pub(crate) nodes: Option<Vec<ReviewThreadNode>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewThreadNode {
    pub(crate) is_resolved: bool,
}

impl ReviewThreadsData {
    /// Unresolved threads among the returned page; a missing pull request
    /// counts as zero.
    pub(crate) fn unresolved_count(self) -> u32 {
        let count = self
            .repository
            .and_then(|repository| repository.pull_request)
            .and_then(|pull_request| pull_request.review_threads)
            .and_then(|threads| threads.nodes)
            .map_or(0, |nodes| nodes.iter().filter(|node| !node.is_resolved).count());
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}
