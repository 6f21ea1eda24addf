//! Octocrab-backed implementation of [`ForgeGateway`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::github::error::ForgeError;
use crate::github::models::api::{
    ApiAuthenticatedUser, ApiCheckRuns, ApiCombinedStatus, ApiCommentTimestamps, ApiCommit,
    ApiIssue, ApiPullRequest, GraphQlEnvelope, ReviewThreadsData,
};
use crate::github::models::{
    CommentThread, CommitStatus, Issue, PullRequest, WorkflowDescriptor, WorkflowRun,
};
use crate::github::repo_key::{PersonalAccessToken, RepoKey};

use super::client::{build_graphql_client, build_rest_client};
use super::error_mapping::map_octocrab_error;
use super::http_utils::{classify_response, decode_json, parse_route};
use super::{ForgeGateway, PAGE_SIZE};

const REVIEW_THREADS_QUERY: &str = "query($owner: String!, $repo: String!, $number: Int!) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $number) {
      reviewThreads(first: 100) {
        totalCount
        nodes { isResolved }
      }
    }
  }
}";

/// Gateway issuing REST and GraphQL requests through Octocrab.
///
/// REST calls and GraphQL calls use separate clients because GitHub documents
/// different authorisation schemes for the two APIs.
pub struct OctocrabForgeGateway {
    rest: Octocrab,
    graphql: Octocrab,
}

impl OctocrabForgeGateway {
    /// Builds a gateway for `token` against `api_base`
    /// (e.g. `https://api.github.com`).
    ///
    /// # Errors
    ///
    /// Returns `ForgeError::InvalidUrl` when the base URI cannot be parsed or
    /// a mapped Octocrab error when a client cannot be constructed.
    pub fn for_token(token: &PersonalAccessToken, api_base: &str) -> Result<Self, ForgeError> {
        Ok(Self {
            rest: build_rest_client(token, api_base)?,
            graphql: build_graphql_client(token, api_base)?,
        })
    }

    /// Issues a GET and returns the body, or `None` for `204 No Content`.
    pub(super) async fn get_body(
        &self,
        operation: &str,
        route: &str,
    ) -> Result<Option<String>, ForgeError> {
        let uri = parse_route(route)?;
        let response = self
            .rest
            ._get_with_headers(uri, None)
            .await
            .map_err(|error| map_octocrab_error(operation, &error))?;
        let status = response.status();
        let body = self
            .rest
            .body_to_string(response)
            .await
            .map_err(|error| map_octocrab_error(operation, &error))?;
        classify_response(status, body)
    }

    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        route: &str,
    ) -> Result<T, ForgeError> {
        let body = self.get_body(operation, route).await?;
        decode_json(operation, body.as_deref())
    }

    pub(super) async fn post_json(
        &self,
        operation: &str,
        route: &str,
        payload: &serde_json::Value,
    ) -> Result<Option<String>, ForgeError> {
        let uri = parse_route(route)?;
        let response = self
            .rest
            ._post(uri, Some(payload))
            .await
            .map_err(|error| map_octocrab_error(operation, &error))?;
        let status = response.status();
        let body = self
            .rest
            .body_to_string(response)
            .await
            .map_err(|error| map_octocrab_error(operation, &error))?;
        classify_response(status, body)
    }

    async fn graphql_query<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<Option<T>, ForgeError> {
        let payload = json!({ "query": query, "variables": variables });
        let response = self
            .graphql
            ._post(parse_route("/graphql")?, Some(&payload))
            .await
            .map_err(|error| map_octocrab_error(operation, &error))?;
        let status = response.status();
        let body = self
            .graphql
            .body_to_string(response)
            .await
            .map_err(|error| map_octocrab_error(operation, &error))?;
        let text = classify_response(status, body)?;
        let envelope: GraphQlEnvelope<T> = decode_json(operation, text.as_deref())?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            return Err(ForgeError::GraphQl {
                messages: errors.into_iter().map(|error| error.message).collect(),
            });
        }
        Ok(envelope.data)
    }

    async fn latest_comment(
        &self,
        operation: &str,
        route: &str,
    ) -> Result<Option<DateTime<Utc>>, ForgeError> {
        let comments: Vec<ApiCommentTimestamps> = self.get_json(operation, route).await?;
        Ok(comments
            .into_iter()
            .next()
            .and_then(ApiCommentTimestamps::latest))
    }
}

#[async_trait]
impl ForgeGateway for OctocrabForgeGateway {
    async fn authenticated_login(&self) -> Result<String, ForgeError> {
        let user: ApiAuthenticatedUser = self.get_json("authenticated user", "/user").await?;
        Ok(user.login)
    }

    async fn list_open_pull_requests(
        &self,
        repo: &RepoKey,
    ) -> Result<Vec<PullRequest>, ForgeError> {
        let route = format!(
            "{}/pulls?state=open&per_page={PAGE_SIZE}",
            repo.api_path()
        );
        let pulls: Vec<ApiPullRequest> = self.get_json("list pulls", &route).await?;
        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }

    async fn list_open_issues(&self, repo: &RepoKey) -> Result<Vec<Issue>, ForgeError> {
        let route = format!(
            "{}/issues?state=open&per_page={PAGE_SIZE}",
            repo.api_path()
        );
        let issues: Vec<ApiIssue> = self.get_json("list issues", &route).await?;
        Ok(issues
            .into_iter()
            .filter(|issue| !issue.is_pull_request())
            .map(Issue::from)
            .collect())
    }

    async fn pull_request(&self, repo: &RepoKey, number: u64) -> Result<PullRequest, ForgeError> {
        self.pull_request_with_line_counts(repo, number).await
    }

    async fn issue(&self, repo: &RepoKey, number: u64) -> Result<Issue, ForgeError> {
        let route = format!("{}/issues/{number}", repo.api_path());
        let issue: ApiIssue = self.get_json("issue", &route).await?;
        Ok(issue.into())
    }

    async fn commit_status(
        &self,
        repo: &RepoKey,
        git_ref: &str,
    ) -> Result<CommitStatus, ForgeError> {
        let status_route = format!("{}/commits/{git_ref}/status", repo.api_path());
        let checks_route = format!(
            "{}/commits/{git_ref}/check-runs?per_page={PAGE_SIZE}",
            repo.api_path()
        );
        let (legacy_result, checks_result) = tokio::join!(
            self.get_json::<ApiCombinedStatus>("commit status", &status_route),
            self.get_json::<ApiCheckRuns>("check runs", &checks_route),
        );

        let legacy = legacy_result
            .inspect_err(|error| tracing::debug!("commit status for {repo}@{git_ref}: {error}"))
            .ok()
            .map(ApiCombinedStatus::into);
        let check_runs = checks_result
            .inspect_err(|error| tracing::debug!("check runs for {repo}@{git_ref}: {error}"))
            .unwrap_or_default()
            .check_runs
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(CommitStatus { legacy, check_runs })
    }

    async fn commit_timestamp(
        &self,
        repo: &RepoKey,
        sha: &str,
    ) -> Result<Option<DateTime<Utc>>, ForgeError> {
        let route = format!("{}/commits/{sha}", repo.api_path());
        let commit: ApiCommit = self.get_json("commit", &route).await?;
        Ok(commit.committed_at())
    }

    async fn latest_comment_at(
        &self,
        repo: &RepoKey,
        number: u64,
        thread: CommentThread,
    ) -> Result<Option<DateTime<Utc>>, ForgeError> {
        let (operation, collection) = match thread {
            CommentThread::Issue => ("issue comments", "issues"),
            CommentThread::Review => ("review comments", "pulls"),
        };
        let route = format!(
            "{}/{collection}/{number}/comments?sort=updated&direction=desc&per_page=1",
            repo.api_path()
        );
        self.latest_comment(operation, &route).await
    }

    async fn unresolved_review_thread_count(
        &self,
        repo: &RepoKey,
        number: u64,
    ) -> Result<u32, ForgeError> {
        let variables = json!({
            "owner": repo.owner(),
            "repo": repo.name(),
            "number": number,
        });
        let data: Option<ReviewThreadsData> = self
            .graphql_query("review threads", REVIEW_THREADS_QUERY, variables)
            .await?;
        Ok(data.map_or(0, ReviewThreadsData::unresolved_count))
    }

    async fn list_active_workflows(
        &self,
        repo: &RepoKey,
    ) -> Result<Vec<WorkflowDescriptor>, ForgeError> {
        self.active_workflows(repo).await
    }

    async fn list_active_workflow_runs(
        &self,
        repo: &RepoKey,
        workflow_id: u64,
    ) -> Result<Vec<WorkflowRun>, ForgeError> {
        Ok(self.active_runs(repo, workflow_id).await)
    }

    async fn dispatch_workflow(
        &self,
        repo: &RepoKey,
        workflow_id: u64,
        git_ref: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<(), ForgeError> {
        let route = format!(
            "{}/actions/workflows/{workflow_id}/dispatches",
            repo.api_path()
        );
        let payload = json!({ "ref": git_ref, "inputs": inputs });
        self.post_json("dispatch workflow", &route, &payload)
            .await
            .map(drop)
    }

    async fn workflow_file_contents(
        &self,
        repo: &RepoKey,
        path: &str,
    ) -> Result<String, ForgeError> {
        self.file_contents(repo, path).await
    }
}
