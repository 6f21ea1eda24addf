//! Unread detection from activity timestamps.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::github::{CommentThread, ForgeGateway, RepoKey};

use super::tolerant::tolerate;

/// Most recent activity on a pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PullRequestActivity {
    /// Committer date of the head commit.
    pub last_commit_at: Option<DateTime<Utc>>,
    /// Latest issue-style or review comment, whichever is newer.
    pub last_comment_at: Option<DateTime<Utc>>,
}

impl PullRequestActivity {
    /// Returns true when any of the activity is newer than `last_viewed`.
    #[must_use]
    pub fn is_unseen_since(&self, last_viewed: Option<DateTime<Utc>>) -> bool {
        has_unseen_activity(last_viewed, [self.last_commit_at, self.last_comment_at])
    }
}

/// Fetches the activity timestamps of a pull request.
///
/// The head commit is only looked up when `head_sha` is known. Every lookup
/// that fails counts as no activity.
pub async fn pull_request_activity<G: ForgeGateway + ?Sized>(
    gateway: &G,
    repo: &RepoKey,
    number: u64,
    head_sha: Option<&str>,
) -> PullRequestActivity {
    let head_commit = async {
        match head_sha {
            Some(sha) => {
                tolerate(
                    "head commit timestamp",
                    gateway.commit_timestamp(repo, sha),
                    None,
                )
                .await
            }
            None => None,
        }
    };
    let (last_commit_at, issue_comment_at, review_comment_at) = tokio::join!(
        head_commit,
        tolerate(
            "latest issue comment",
            gateway.latest_comment_at(repo, number, CommentThread::Issue),
            None,
        ),
        tolerate(
            "latest review comment",
            gateway.latest_comment_at(repo, number, CommentThread::Review),
            None,
        ),
    );
    PullRequestActivity {
        last_commit_at,
        last_comment_at: issue_comment_at.max(review_comment_at),
    }
}

/// Fetches the time of the latest comment on an issue; failures count as
/// no comment.
pub async fn issue_activity<G: ForgeGateway + ?Sized>(
    gateway: &G,
    repo: &RepoKey,
    number: u64,
) -> Option<DateTime<Utc>> {
    tolerate(
        "latest issue comment",
        gateway.latest_comment_at(repo, number, CommentThread::Issue),
        None,
    )
    .await
}

/// Returns true when any activity happened after the last view.
///
/// Items that were never viewed are never unread, whatever their activity.
#[must_use]
pub fn has_unseen_activity(
    last_viewed: Option<DateTime<Utc>>,
    activity: impl IntoIterator<Item = Option<DateTime<Utc>>>,
) -> bool {
    let Some(viewed_at) = last_viewed else {
        return false;
    };
    activity
        .into_iter()
        .flatten()
        .any(|timestamp| timestamp > viewed_at)
}
