//! Sidebar refresh pipeline.
//!
//! [`Aggregator::refresh`] turns the stored pins, tracked repositories and
//! last-viewed times into a [`SidebarView`]:
//!
//! 1. resolve the repository set from the store (an empty set short-circuits
//!    to [`SidebarView::Empty`] without any remote call);
//! 2. resolve the authenticated login;
//! 3. refresh every repository concurrently (listing, pinned item fetches,
//!    detail overlay, auto-prune, partitioning, enrichment, workflow runs);
//! 4. assemble the per-repository views.
//!
//! Only steps 1 and 2 can fail. Everything after them degrades to defaults
//! through the [`tolerant`] combinators.

mod ci;
mod pipeline;
pub mod tolerant;
mod unread;
mod view;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use futures::future::join_all;

use crate::github::{ForgeError, ForgeGateway, RepoKey, WorkflowDescriptor};
use crate::persistence::{LastViewed, PinnedSet, SidebarStore};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

pub use ci::{CiStatus, classify};
pub use unread::{PullRequestActivity, has_unseen_activity, issue_activity, pull_request_activity};
pub use view::{IssueView, MergeBadge, PullRequestView, RepoView, SidebarView, WorkflowView};

/// Stored state shared by every repository of one refresh.
struct RefreshContext {
    login: String,
    pinned_pull_requests: PinnedSet<u64>,
    pinned_issues: PinnedSet<u64>,
    pinned_workflows: PinnedSet<WorkflowDescriptor>,
    viewed_pull_requests: LastViewed,
    viewed_issues: LastViewed,
}

/// Builds sidebar views from a gateway and the sidebar store.
pub struct Aggregator<'a, G: ForgeGateway + ?Sized> {
    gateway: &'a G,
    store: &'a SidebarStore,
    telemetry: &'a dyn TelemetrySink,
}

impl<'a, G: ForgeGateway + ?Sized> Aggregator<'a, G> {
    /// Creates an aggregator over `gateway` and `store`.
    #[must_use]
    pub const fn new(
        gateway: &'a G,
        store: &'a SidebarStore,
        telemetry: &'a dyn TelemetrySink,
    ) -> Self {
        Self {
            gateway,
            store,
            telemetry,
        }
    }

    /// Runs a full refresh.
    ///
    /// Pinned pull requests and issues that are no longer open are unpinned
    /// as a side effect.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::Storage`] when the stored state cannot be read
    /// and the gateway's error when the authenticated login cannot be
    /// resolved. Failures of individual fetches never fail the refresh.
    pub async fn refresh(&self) -> Result<SidebarView, ForgeError> {
        let repos = self.store.repo_set().await?;
        if repos.is_empty() {
            tracing::debug!("no tracked or pinned repositories; skipping refresh");
            return Ok(SidebarView::Empty);
        }

        let login = self.gateway.authenticated_login().await?;
        let context = RefreshContext {
            login,
            pinned_pull_requests: self.store.pinned_pull_requests().await?,
            pinned_issues: self.store.pinned_issues().await?,
            pinned_workflows: self.store.pinned_workflows().await?,
            viewed_pull_requests: self.store.last_viewed_pull_requests().await?,
            viewed_issues: self.store.last_viewed_issues().await?,
        };
        tracing::debug!(
            "refreshing {} repositories for {}",
            repos.len(),
            context.login
        );

        let views = join_all(repos.iter().map(|repo| self.refresh_repo(repo, &context))).await;
        let repositories: BTreeMap<RepoKey, RepoView> = repos.into_iter().zip(views).collect();

        tracing::info!("refreshed {} repositories", repositories.len());
        self.telemetry.record(TelemetryEvent::RefreshCompleted {
            repositories: repositories.len(),
        });

        Ok(SidebarView::Repositories {
            login: context.login,
            repositories,
        })
    }

    /// Refetches only the active runs of pinned workflows.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::Storage`] when the pinned workflows cannot be
    /// read. Failed run listings yield empty run lists.
    pub async fn refresh_workflow_runs(
        &self,
    ) -> Result<BTreeMap<RepoKey, Vec<WorkflowView>>, ForgeError> {
        let pinned = self.store.pinned_workflows().await?;
        let views = join_all(
            pinned
                .iter()
                .map(|(repo, workflows)| self.workflow_views(repo, workflows)),
        )
        .await;

        Ok(pinned.repos().cloned().zip(views).collect())
    }
}
