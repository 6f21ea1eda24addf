//! GitHub API access for the sidebar.
//!
//! This module wraps Octocrab to list and fetch pull requests, issues, CI
//! signals and Actions workflows. Errors are mapped into [`ForgeError`] so
//! callers can surface precise failures without exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod models;
pub mod repo_key;

pub use error::ForgeError;
pub use gateway::{ForgeGateway, GatewayProvider, OctocrabForgeGateway, OctocrabGatewayProvider};
pub use models::{
    CheckRun, CommentThread, CommitStatus, Issue, ItemState, LegacyStatus, MergeableState,
    PullRequest, WorkflowDescriptor, WorkflowRun,
};
pub use repo_key::{PersonalAccessToken, RepoKey};

#[cfg(test)]
pub use gateway::{MockForgeGateway, MockGatewayProvider};
