//! Single pull request retrieval with the line-count fallback.

use crate::github::error::ForgeError;
use crate::github::models::PullRequest;
use crate::github::models::api::{ApiPullRequest, ApiPullRequestFile};
use crate::github::repo_key::RepoKey;

use super::PAGE_SIZE;
use super::forge::OctocrabForgeGateway;

/// Sums the per-file line counts of a file listing.
fn sum_line_counts(files: &[ApiPullRequestFile]) -> (u64, u64) {
    files.iter().fold((0, 0), |(added, deleted), file| {
        (
            added.saturating_add(file.additions.unwrap_or(0)),
            deleted.saturating_add(file.deletions.unwrap_or(0)),
        )
    })
}

impl OctocrabForgeGateway {
    pub(super) async fn pull_request_with_line_counts(
        &self,
        repo: &RepoKey,
        number: u64,
    ) -> Result<PullRequest, ForgeError> {
        let route = format!("{}/pulls/{number}", repo.api_path());
        let pull: ApiPullRequest = self.get_json("pull request", &route).await?;

        if !pull.lacks_line_counts() {
            return Ok(pull.into());
        }

        let (additions, deletions) = self.file_line_counts(repo, number).await;
        Ok(pull.into_pull_request(additions, deletions))
    }

    /// Line counts from the first page of the changed-file listing.
    ///
    /// Failures are logged and reported as zero counts.
    async fn file_line_counts(&self, repo: &RepoKey, number: u64) -> (u64, u64) {
        let route = format!(
            "{}/pulls/{number}/files?per_page={PAGE_SIZE}",
            repo.api_path()
        );
        match self
            .get_json::<Vec<ApiPullRequestFile>>("pull request files", &route)
            .await
        {
            Ok(files) => sum_line_counts(&files),
            Err(error) => {
                tracing::warn!("line counts for {repo}#{number} unavailable: {error}");
                (0, 0)
            }
        }
    }
}
