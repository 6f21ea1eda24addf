//! forgebar library crate providing a GitHub sidebar aggregator.
//!
//! The library wraps Octocrab to list pull requests, issues, and workflows
//! across tracked repositories, merges them with locally pinned items, and
//! answers a closed set of JSON commands that a presentation layer can send.

pub mod aggregate;
pub mod command;
pub mod config;
pub mod github;
pub mod persistence;
pub mod telemetry;
pub mod watch;
pub mod workflow;

pub use aggregate::{Aggregator, SidebarView};
pub use command::{Command, CommandDispatcher, Response};
pub use config::{ForgebarConfig, OperationMode};
pub use github::{
    ForgeError, ForgeGateway, GatewayProvider, OctocrabForgeGateway, OctocrabGatewayProvider,
    PersonalAccessToken, RepoKey,
};
pub use persistence::SidebarStore;
