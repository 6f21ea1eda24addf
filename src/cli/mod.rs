//! CLI operation mode handlers.
//!
//! This module contains the implementations for different operation modes:
//! - [`migrations`]: Database schema migrations
//! - [`single_command`]: Run one JSON command, or one refresh
//! - [`watch_mode`]: Refresh on a schedule until interrupted
//!
//! Opening the store and dispatcher lives in [`session`]; output formatting
//! utilities are in [`output`].

pub mod migrations;
pub mod output;
pub mod session;
pub mod single_command;
pub mod watch_mode;
