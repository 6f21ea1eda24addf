//! Per-repository stages of a refresh.

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::github::{ForgeGateway, Issue, PullRequest, RepoKey, WorkflowDescriptor};
use crate::telemetry::TelemetryEvent;

use super::ci::{CiStatus, classify};
use super::tolerant::{join_tolerant, tolerate, tolerate_missing};
use super::unread::{has_unseen_activity, issue_activity, pull_request_activity};
use super::view::{IssueView, MergeBadge, PullRequestView, RepoView, WorkflowView};
use super::{Aggregator, RefreshContext};

/// Open items of one repository after auto-prune.
struct OpenItems {
    pull_requests: Vec<PullRequest>,
    issues: Vec<Issue>,
}

fn orders_like_pins<T>(items: &mut [T], pins: &[u64], number: impl Fn(&T) -> u64) {
    items.sort_by_key(|item| pins.iter().position(|pinned| *pinned == number(item)));
}

impl<G: ForgeGateway + ?Sized> Aggregator<'_, G> {
    pub(super) async fn refresh_repo(&self, repo: &RepoKey, context: &RefreshContext) -> RepoView {
        let login = context.login.as_str();
        let pinned_pulls = context.pinned_pull_requests.get(repo);
        let pinned_issues = context.pinned_issues.get(repo);

        let (listed_pulls, listed_issues) = tokio::join!(
            tolerate(
                "list open pull requests",
                self.gateway.list_open_pull_requests(repo),
                Vec::new(),
            ),
            tolerate(
                "list open issues",
                self.gateway.list_open_issues(repo),
                Vec::new(),
            ),
        );
        let pull_candidates: Vec<PullRequest> = listed_pulls
            .into_iter()
            .filter(|pull| {
                pull.is_authored_by(login)
                    || pull.requests_review_from(login)
                    || pinned_pulls.contains(&pull.number)
            })
            .collect();
        let issue_candidates: Vec<Issue> = listed_issues
            .into_iter()
            .filter(|issue| issue.is_authored_by(login) || pinned_issues.contains(&issue.number))
            .collect();

        let unlisted_pulls: Vec<u64> = pinned_pulls
            .iter()
            .copied()
            .filter(|number| !pull_candidates.iter().any(|pull| pull.number == *number))
            .collect();
        let unlisted_issues: Vec<u64> = pinned_issues
            .iter()
            .copied()
            .filter(|number| !issue_candidates.iter().any(|issue| issue.number == *number))
            .collect();
        let (fetched_pulls, fetched_issues) = tokio::join!(
            join_tolerant(
                "fetch pinned pull request",
                unlisted_pulls
                    .iter()
                    .map(|number| self.gateway.pull_request(repo, *number)),
            ),
            join_tolerant(
                "fetch pinned issue",
                unlisted_issues
                    .iter()
                    .map(|number| self.gateway.issue(repo, *number)),
            ),
        );

        let detailed_pulls = join_all(
            pull_candidates
                .into_iter()
                .map(|listed| self.overlay_detail(repo, listed)),
        )
        .await;

        let resolved_pulls = detailed_pulls
            .into_iter()
            .chain(fetched_pulls.into_iter().flatten())
            .collect();
        let resolved_issues = issue_candidates
            .into_iter()
            .chain(fetched_issues.into_iter().flatten())
            .collect();
        let open = self
            .prune_closed(repo, context, resolved_pulls, resolved_issues)
            .await;

        self.assemble(repo, context, open).await
    }

    /// Overlays the single-PR detail onto a listing record, keeping the
    /// listing record when the detail cannot be fetched.
    async fn overlay_detail(&self, repo: &RepoKey, listed: PullRequest) -> PullRequest {
        match self.gateway.pull_request(repo, listed.number).await {
            Ok(detail) => listed.overlay(detail),
            Err(error) => {
                tracing::warn!(
                    "pull request detail for {repo}#{} failed, keeping listing: {error}",
                    listed.number
                );
                listed
            }
        }
    }

    /// Unpins every pinned item that is no longer open and drops all
    /// non-open items.
    async fn prune_closed(
        &self,
        repo: &RepoKey,
        context: &RefreshContext,
        pull_requests: Vec<PullRequest>,
        issues: Vec<Issue>,
    ) -> OpenItems {
        let pinned_pulls = context.pinned_pull_requests.get(repo);
        let pinned_issues = context.pinned_issues.get(repo);

        let (open_pulls, closed_pulls): (Vec<PullRequest>, Vec<PullRequest>) = pull_requests
            .into_iter()
            .partition(|pull| pull.state.is_open());
        let (open_issues, closed_issues): (Vec<Issue>, Vec<Issue>) =
            issues.into_iter().partition(|issue| issue.state.is_open());

        let mut pruned_pulls = Vec::new();
        for number in closed_pulls
            .iter()
            .map(|pull| pull.number)
            .filter(|number| pinned_pulls.contains(number))
        {
            match self.store.unpin_pull_request(repo, number).await {
                Ok(_) => pruned_pulls.push(number),
                Err(error) => tracing::warn!("could not unpin {repo}#{number}: {error}"),
            }
        }
        let mut pruned_issues = Vec::new();
        for number in closed_issues
            .iter()
            .map(|issue| issue.number)
            .filter(|number| pinned_issues.contains(number))
        {
            match self.store.unpin_issue(repo, number).await {
                Ok(_) => pruned_issues.push(number),
                Err(error) => tracing::warn!("could not unpin issue {repo}#{number}: {error}"),
            }
        }

        if !pruned_pulls.is_empty() || !pruned_issues.is_empty() {
            tracing::info!(
                "unpinned closed items in {repo}: pull requests {pruned_pulls:?}, issues {pruned_issues:?}"
            );
            self.telemetry.record(TelemetryEvent::PinsPruned {
                repo: repo.to_string(),
                pull_requests: pruned_pulls,
                issues: pruned_issues,
            });
        }

        OpenItems {
            pull_requests: open_pulls,
            issues: open_issues,
        }
    }

    /// Partitions the open items into sections and enriches them.
    async fn assemble(&self, repo: &RepoKey, context: &RefreshContext, open: OpenItems) -> RepoView {
        let login = context.login.as_str();
        let pinned_pulls = context.pinned_pull_requests.get(repo);
        let pinned_issues = context.pinned_issues.get(repo);

        let (mine, others): (Vec<PullRequest>, Vec<PullRequest>) = open
            .pull_requests
            .into_iter()
            .partition(|pull| pull.is_authored_by(login));
        let (mut pinned, review): (Vec<PullRequest>, Vec<PullRequest>) = others
            .into_iter()
            .partition(|pull| pinned_pulls.contains(&pull.number));
        orders_like_pins(&mut pinned, pinned_pulls, |pull| pull.number);

        let (my_issues, mut other_issues): (Vec<Issue>, Vec<Issue>) = open
            .issues
            .into_iter()
            .partition(|issue| issue.is_authored_by(login));
        orders_like_pins(&mut other_issues, pinned_issues, |issue| issue.number);

        let (my_pull_requests, pinned_pull_requests, review_pull_requests) = tokio::join!(
            self.enrich_pull_requests(repo, context, mine),
            self.enrich_pull_requests(repo, context, pinned),
            self.enrich_pull_requests(repo, context, review),
        );
        let (my_issue_views, pinned_issue_views, workflows) = tokio::join!(
            self.enrich_issues(repo, context, my_issues),
            self.enrich_issues(repo, context, other_issues),
            self.workflow_views(repo, context.pinned_workflows.get(repo)),
        );

        RepoView {
            my_pull_requests,
            pinned_pull_requests,
            review_pull_requests,
            my_issues: my_issue_views,
            pinned_issues: pinned_issue_views,
            workflows,
        }
    }

    async fn enrich_pull_requests(
        &self,
        repo: &RepoKey,
        context: &RefreshContext,
        pull_requests: Vec<PullRequest>,
    ) -> Vec<PullRequestView> {
        join_all(pull_requests.into_iter().map(|pull_request| {
            let last_viewed = context
                .viewed_pull_requests
                .viewed_at(repo, pull_request.number);
            self.enrich_pull_request(repo, pull_request, last_viewed)
        }))
        .await
    }

    async fn enrich_pull_request(
        &self,
        repo: &RepoKey,
        pull_request: PullRequest,
        last_viewed: Option<DateTime<Utc>>,
    ) -> PullRequestView {
        let number = pull_request.number;
        let head_sha = pull_request.head_sha.as_deref();

        let (unresolved_threads, ci, unread) = tokio::join!(
            tolerate_missing(
                "unresolved review threads",
                self.gateway.unresolved_review_thread_count(repo, number),
            ),
            self.ci_status(repo, head_sha),
            self.pull_request_unread(repo, number, head_sha, last_viewed),
        );

        PullRequestView {
            merge_badge: MergeBadge::for_pull_request(&pull_request),
            pull_request,
            unresolved_threads,
            ci,
            unread,
        }
    }

    async fn ci_status(&self, repo: &RepoKey, head_sha: Option<&str>) -> Option<CiStatus> {
        let sha = head_sha?;
        tolerate_missing("commit status", self.gateway.commit_status(repo, sha))
            .await
            .map(|status| classify(&status))
    }

    async fn pull_request_unread(
        &self,
        repo: &RepoKey,
        number: u64,
        head_sha: Option<&str>,
        last_viewed: Option<DateTime<Utc>>,
    ) -> bool {
        if last_viewed.is_none() {
            return false;
        }
        pull_request_activity(self.gateway, repo, number, head_sha)
            .await
            .is_unseen_since(last_viewed)
    }

    async fn enrich_issues(
        &self,
        repo: &RepoKey,
        context: &RefreshContext,
        issues: Vec<Issue>,
    ) -> Vec<IssueView> {
        join_all(issues.into_iter().map(|issue| async move {
            let last_viewed = context.viewed_issues.viewed_at(repo, issue.number);
            let unread = if last_viewed.is_some() {
                let commented_at = issue_activity(self.gateway, repo, issue.number).await;
                has_unseen_activity(last_viewed, [commented_at])
            } else {
                false
            };
            IssueView { issue, unread }
        }))
        .await
    }

    pub(super) async fn workflow_views(
        &self,
        repo: &RepoKey,
        workflows: &[WorkflowDescriptor],
    ) -> Vec<WorkflowView> {
        join_all(workflows.iter().map(|workflow| async move {
            let active_runs = tolerate(
                "active workflow runs",
                self.gateway.list_active_workflow_runs(repo, workflow.id),
                Vec::new(),
            )
            .await;
            WorkflowView {
                workflow: workflow.clone(),
                active_runs,
            }
        }))
        .await
    }
}
