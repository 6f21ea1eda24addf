//! Builders for pull request and issue fixtures used in tests.
//!
//! # Examples
//!
//! ```
//! use forgebar::github::models::test_support::open_pull_request;
//!
//! let pr = open_pull_request(42, "alice");
//! assert_eq!(pr.number, 42);
//! assert!(pr.state.is_open());
//! ```

use super::{Issue, ItemState, MergeableState, PullRequest};

/// Constructs an open pull request authored by `author`.
///
/// The head SHA is derived from the number so each fixture has a distinct
/// commit reference.
#[must_use]
pub fn open_pull_request(number: u64, author: &str) -> PullRequest {
    PullRequest {
        number,
        title: format!("Pull request {number}"),
        author: Some(author.to_owned()),
        state: ItemState::Open,
        draft: false,
        mergeable_state: MergeableState::Unknown,
        additions: 0,
        deletions: 0,
        head_sha: Some(format!("sha-{number}")),
        created_at: None,
        requested_reviewers: Vec::new(),
        html_url: None,
    }
}

/// Constructs a closed or merged pull request authored by `author`.
#[must_use]
pub fn closed_pull_request(number: u64, author: &str) -> PullRequest {
    PullRequest {
        state: ItemState::NotOpen,
        ..open_pull_request(number, author)
    }
}

/// Constructs an open issue opened by `author`.
#[must_use]
pub fn open_issue(number: u64, author: &str) -> Issue {
    Issue {
        number,
        title: format!("Issue {number}"),
        author: Some(author.to_owned()),
        state: ItemState::Open,
        labels: Vec::new(),
        created_at: None,
        html_url: None,
    }
}

/// Constructs a closed issue opened by `author`.
#[must_use]
pub fn closed_issue(number: u64, author: &str) -> Issue {
    Issue {
        state: ItemState::NotOpen,
        ..open_issue(number, author)
    }
}
