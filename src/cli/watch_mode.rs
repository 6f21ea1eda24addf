//! Scheduled refresh until interrupted.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use forgebar::watch::{RefreshSchedule, RefreshTarget, watch};
use forgebar::{Command, CommandDispatcher};

use super::output::write_response_to;

/// Dispatches refresh commands and writes each response as a JSON line.
///
/// Failed refreshes are logged and skipped; the next tick tries again.
pub struct DispatchingTarget<'a, W> {
    dispatcher: &'a CommandDispatcher,
    writer: Mutex<W>,
}

impl<'a, W: Write + Send> DispatchingTarget<'a, W> {
    /// Creates a target writing to `writer`.
    #[must_use]
    pub const fn new(dispatcher: &'a CommandDispatcher, writer: W) -> Self {
        Self {
            dispatcher,
            writer: Mutex::new(writer),
        }
    }

    async fn dispatch_and_write(&self, command: Command) {
        let response = match self.dispatcher.dispatch(command).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!("scheduled refresh failed: {error}");
                return;
            }
        };

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(error) = write_response_to(&mut *writer, &response) {
            tracing::warn!("could not write refresh result: {error}");
        }
    }
}

#[async_trait]
impl<W: Write + Send> RefreshTarget for DispatchingTarget<'_, W> {
    async fn refresh_all(&self) {
        self.dispatch_and_write(Command::Refresh).await;
    }

    async fn refresh_workflow_runs(&self) {
        self.dispatch_and_write(Command::RefreshWorkflowRuns).await;
    }
}

/// Refreshes on `schedule` until Ctrl-C.
pub async fn run(dispatcher: &CommandDispatcher, schedule: RefreshSchedule) {
    let target = DispatchingTarget::new(dispatcher, io::stdout());
    watch(&target, schedule, shutdown_signal()).await;
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C, watching until killed: {error}");
        std::future::pending::<()>().await;
    }
}
