//! Exhaustive execution of [`Command`]s.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::aggregate::{Aggregator, classify, issue_activity, pull_request_activity};
use crate::github::{ForgeError, ForgeGateway, GatewayProvider, PersonalAccessToken, RepoKey};
use crate::persistence::SidebarStore;
use crate::telemetry::TelemetrySink;
use crate::workflow::{find_workflow_by_path, parse_dispatch_inputs};

use super::{Command, InputValue, Response};

/// Answers commands against the sidebar store and GitHub.
///
/// Remote commands build their gateway from the stored credential on every
/// call, so a token saved by one command is used by the next.
pub struct CommandDispatcher {
    store: Arc<SidebarStore>,
    provider: Arc<dyn GatewayProvider>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl CommandDispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        store: Arc<SidebarStore>,
        provider: Arc<dyn GatewayProvider>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            store,
            provider,
            telemetry,
        }
    }

    /// The store commands read and write.
    #[must_use]
    pub fn store(&self) -> &SidebarStore {
        &self.store
    }

    /// Executes `command`.
    ///
    /// # Errors
    ///
    /// Remote commands fail with [`ForgeError::Unauthenticated`] when no
    /// token is stored and with the gateway's error when the primary request
    /// fails. Store failures surface as [`ForgeError::Storage`].
    #[expect(
        clippy::too_many_lines,
        reason = "One arm per command keeps the dispatch exhaustive"
    )]
    pub async fn dispatch(&self, command: Command) -> Result<Response, ForgeError> {
        match command {
            Command::GetCredentialPresence => Ok(Response::CredentialPresence(
                self.store.credential().await?.is_some(),
            )),
            Command::SetCredential { token } => {
                let credential = PersonalAccessToken::new(token)?;
                self.store.set_credential(&credential).await?;
                Ok(Response::Done)
            }
            Command::ClearCredential => {
                self.store.clear_credential().await?;
                Ok(Response::Done)
            }
            Command::GetAuthenticatedLogin => Ok(Response::Login(
                self.gateway().await?.authenticated_login().await?,
            )),
            Command::ListMyOpenPullRequests { repo } => self.my_open_pull_requests(&repo).await,
            Command::ListReviewRequestedPullRequests { repo } => {
                self.review_requested_pull_requests(&repo).await
            }
            Command::ListMyOpenIssues { repo } => self.my_open_issues(&repo).await,
            Command::GetPullRequest { repo, number } => Ok(Response::PullRequest(
                self.gateway().await?.pull_request(&repo, number).await?,
            )),
            Command::GetIssue { repo, number } => Ok(Response::Issue(
                self.gateway().await?.issue(&repo, number).await?,
            )),
            Command::GetCommitStatus { repo, git_ref } => {
                let status = self.gateway().await?.commit_status(&repo, &git_ref).await?;
                let ci = classify(&status);
                Ok(Response::CommitStatus { status, ci })
            }
            Command::GetUnresolvedCount { repo, number } => Ok(Response::UnresolvedCount(
                self.gateway()
                    .await?
                    .unresolved_review_thread_count(&repo, number)
                    .await?,
            )),
            Command::GetPullRequestActivity {
                repo,
                number,
                head_sha,
            } => {
                let gateway = self.gateway().await?;
                let activity =
                    pull_request_activity(gateway.as_ref(), &repo, number, head_sha.as_deref())
                        .await;
                Ok(Response::PullRequestActivity(activity))
            }
            Command::GetIssueActivity { repo, number } => {
                let gateway = self.gateway().await?;
                Ok(Response::IssueActivity(
                    issue_activity(gateway.as_ref(), &repo, number).await,
                ))
            }
            Command::ListWorkflows { repo } => Ok(Response::Workflows(
                self.gateway().await?.list_active_workflows(&repo).await?,
            )),
            Command::GetWorkflowFile { repo, path } => Ok(Response::WorkflowFile(
                self.gateway()
                    .await?
                    .workflow_file_contents(&repo, &path)
                    .await?,
            )),
            Command::GetWorkflowInputs { repo, path } => {
                let contents = self
                    .gateway()
                    .await?
                    .workflow_file_contents(&repo, &path)
                    .await?;
                Ok(Response::WorkflowInputs(parse_dispatch_inputs(&contents)?))
            }
            Command::DispatchWorkflow {
                repo,
                workflow_id,
                git_ref,
                inputs,
            } => self.dispatch_workflow(&repo, workflow_id, &git_ref, inputs).await,
            Command::ListWorkflowRuns { repo, workflow_id } => Ok(Response::WorkflowRuns(
                self.gateway()
                    .await?
                    .list_active_workflow_runs(&repo, workflow_id)
                    .await?,
            )),
            Command::GetPinnedPullRequests => Ok(Response::PinnedNumbers(
                self.store.pinned_pull_requests().await?,
            )),
            Command::PinPullRequest { repo, number } => Ok(Response::Changed(
                self.store.pin_pull_request(repo, number).await?,
            )),
            Command::UnpinPullRequest { repo, number } => Ok(Response::Changed(
                self.store.unpin_pull_request(&repo, number).await?,
            )),
            Command::GetPinnedIssues => {
                Ok(Response::PinnedNumbers(self.store.pinned_issues().await?))
            }
            Command::PinIssue { repo, number } => Ok(Response::Changed(
                self.store.pin_issue(repo, number).await?,
            )),
            Command::UnpinIssue { repo, number } => Ok(Response::Changed(
                self.store.unpin_issue(&repo, number).await?,
            )),
            Command::GetPinnedWorkflows => Ok(Response::PinnedWorkflows(
                self.store.pinned_workflows().await?,
            )),
            Command::PinWorkflow { repo, workflow } => Ok(Response::Changed(
                self.store.pin_workflow(repo, workflow).await?,
            )),
            Command::PinWorkflowByPath { repo, path } => {
                self.pin_workflow_by_path(repo, &path).await
            }
            Command::UnpinWorkflow { repo, workflow_id } => Ok(Response::Changed(
                self.store.unpin_workflow(&repo, workflow_id).await?,
            )),
            Command::GetTrackedRepos => {
                Ok(Response::TrackedRepos(self.store.tracked_repos().await?))
            }
            Command::TrackRepo { repo } => {
                Ok(Response::Changed(self.store.track_repo(repo).await?))
            }
            Command::RemoveRepo { repo } => {
                self.store.remove_repo(&repo).await?;
                Ok(Response::Done)
            }
            Command::RecordViewedPullRequest {
                repo,
                number,
                viewed_at,
            } => {
                self.store
                    .record_viewed_pull_request(repo, number, viewed_or_now(viewed_at))
                    .await?;
                Ok(Response::Done)
            }
            Command::RecordViewedIssue {
                repo,
                number,
                viewed_at,
            } => {
                self.store
                    .record_viewed_issue(repo, number, viewed_or_now(viewed_at))
                    .await?;
                Ok(Response::Done)
            }
            Command::GetLastViewedPullRequests => Ok(Response::LastViewed(
                self.store.last_viewed_pull_requests().await?,
            )),
            Command::GetLastViewedIssues => Ok(Response::LastViewed(
                self.store.last_viewed_issues().await?,
            )),
            Command::Refresh => {
                let gateway = self.gateway().await?;
                let view = self.aggregator(gateway.as_ref()).refresh().await?;
                Ok(Response::Sidebar(view))
            }
            Command::RefreshWorkflowRuns => {
                let gateway = self.gateway().await?;
                let runs = self
                    .aggregator(gateway.as_ref())
                    .refresh_workflow_runs()
                    .await?;
                Ok(Response::WorkflowViews(runs))
            }
        }
    }

    /// Gateway authorised with the stored token.
    async fn gateway(&self) -> Result<Arc<dyn ForgeGateway>, ForgeError> {
        let token = self
            .store
            .credential()
            .await?
            .ok_or(ForgeError::Unauthenticated)?;
        self.provider.gateway(&token)
    }

    fn aggregator<'a>(
        &'a self,
        gateway: &'a dyn ForgeGateway,
    ) -> Aggregator<'a, dyn ForgeGateway + 'a> {
        Aggregator::new(gateway, &self.store, self.telemetry.as_ref())
    }

    async fn my_open_pull_requests(&self, repo: &RepoKey) -> Result<Response, ForgeError> {
        let gateway = self.gateway().await?;
        let login = gateway.authenticated_login().await?;
        let pulls = gateway.list_open_pull_requests(repo).await?;
        Ok(Response::PullRequests(
            pulls
                .into_iter()
                .filter(|pull| pull.is_authored_by(&login))
                .collect(),
        ))
    }

    async fn review_requested_pull_requests(
        &self,
        repo: &RepoKey,
    ) -> Result<Response, ForgeError> {
        let gateway = self.gateway().await?;
        let login = gateway.authenticated_login().await?;
        let pulls = gateway.list_open_pull_requests(repo).await?;
        Ok(Response::PullRequests(
            pulls
                .into_iter()
                .filter(|pull| pull.requests_review_from(&login))
                .collect(),
        ))
    }

    async fn my_open_issues(&self, repo: &RepoKey) -> Result<Response, ForgeError> {
        let gateway = self.gateway().await?;
        let login = gateway.authenticated_login().await?;
        let issues = gateway.list_open_issues(repo).await?;
        Ok(Response::Issues(
            issues
                .into_iter()
                .filter(|issue| issue.is_authored_by(&login))
                .collect(),
        ))
    }

    async fn dispatch_workflow(
        &self,
        repo: &RepoKey,
        workflow_id: u64,
        git_ref: &str,
        inputs: BTreeMap<String, InputValue>,
    ) -> Result<Response, ForgeError> {
        let text_inputs: BTreeMap<String, String> = inputs
            .into_iter()
            .map(|(name, value)| (name, value.into_text()))
            .collect();
        self.gateway()
            .await?
            .dispatch_workflow(repo, workflow_id, git_ref, &text_inputs)
            .await?;
        tracing::info!("dispatched workflow {workflow_id} in {repo} on {git_ref}");
        Ok(Response::Done)
    }

    async fn pin_workflow_by_path(
        &self,
        repo: RepoKey,
        path: &str,
    ) -> Result<Response, ForgeError> {
        let workflows = self.gateway().await?.list_active_workflows(&repo).await?;
        let workflow = find_workflow_by_path(&workflows, path)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound {
                what: format!("workflow {path} in {repo}"),
            })?;
        self.store.pin_workflow(repo, workflow.clone()).await?;
        Ok(Response::PinnedWorkflow(workflow))
    }
}

fn viewed_or_now(viewed_at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    viewed_at.unwrap_or_else(Utc::now)
}
