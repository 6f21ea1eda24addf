//! GitHub Actions workflow listings, runs and workflow file contents.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use crate::github::error::ForgeError;
use crate::github::models::api::{ApiContent, ApiWorkflowRuns, ApiWorkflows};
use crate::github::models::{WorkflowDescriptor, WorkflowRun};
use crate::github::repo_key::RepoKey;

use super::PAGE_SIZE;
use super::forge::OctocrabForgeGateway;

/// Run statuses that count as active.
const ACTIVE_RUN_STATUSES: [&str; 2] = ["in_progress", "queued"];

/// Decodes a base64 `content` field as returned by the contents API.
///
/// GitHub wraps the encoded body at 60 columns, so line breaks are removed
/// before decoding.
pub(super) fn decode_content(path: &str, content: Option<&str>) -> Result<String, ForgeError> {
    let Some(encoded) = content else {
        return Err(ForgeError::NotFound {
            what: format!("content of {path}"),
        });
    };
    let compact: String = encoded
        .chars()
        .filter(|character| !character.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|error| ForgeError::Decode {
            message: format!("content of {path} is not valid base64: {error}"),
        })?;
    String::from_utf8(bytes).map_err(|error| ForgeError::Decode {
        message: format!("content of {path} is not UTF-8: {error}"),
    })
}

/// Percent-encodes each `/`-separated segment of a repository file path.
///
/// Empty segments are dropped, so leading or doubled slashes do not add
/// path components.
pub(super) fn encode_file_path(path: &str) -> Result<String, ForgeError> {
    let mut scratch = Url::parse("https://contents.invalid/")
        .map_err(|error| ForgeError::InvalidUrl(error.to_string()))?;
    scratch
        .path_segments_mut()
        .map_err(|()| ForgeError::InvalidUrl(format!("cannot encode {path}")))?
        .clear()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    Ok(scratch.path().to_owned())
}

impl OctocrabForgeGateway {
    pub(super) async fn active_workflows(
        &self,
        repo: &RepoKey,
    ) -> Result<Vec<WorkflowDescriptor>, ForgeError> {
        let route = format!(
            "{}/actions/workflows?per_page={PAGE_SIZE}",
            repo.api_path()
        );
        let listing: ApiWorkflows = self.get_json("list workflows", &route).await?;
        Ok(listing
            .workflows
            .into_iter()
            .filter(|workflow| workflow.is_active())
            .map(Into::into)
            .collect())
    }

    /// Union of in-progress and queued runs belonging to `workflow_id`.
    ///
    /// Each status listing is fetched independently; a failed listing
    /// contributes no runs.
    pub(super) async fn active_runs(&self, repo: &RepoKey, workflow_id: u64) -> Vec<WorkflowRun> {
        let requests = ACTIVE_RUN_STATUSES.map(|status| {
            let route = format!(
                "{}/actions/runs?status={status}&per_page={PAGE_SIZE}",
                repo.api_path()
            );
            async move {
                self.get_json::<ApiWorkflowRuns>("list workflow runs", &route)
                    .await
                    .inspect_err(|error| {
                        tracing::warn!("{status} runs for {repo} unavailable: {error}");
                    })
                    .unwrap_or_default()
            }
        });

        futures::future::join_all(requests)
            .await
            .into_iter()
            .flat_map(|listing| listing.workflow_runs)
            .filter(|run| run.workflow_id == workflow_id)
            .map(Into::into)
            .collect()
    }

    pub(super) async fn file_contents(
        &self,
        repo: &RepoKey,
        path: &str,
    ) -> Result<String, ForgeError> {
        let route = format!("{}/contents{}", repo.api_path(), encode_file_path(path)?);
        let content: ApiContent = self.get_json("file contents", &route).await?;
        decode_content(path, content.content.as_deref())
    }
}
