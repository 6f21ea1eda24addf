//! CI status classification from check runs and the legacy commit status.

use serde::{Deserialize, Serialize};

use crate::github::{CheckRun, CommitStatus};

/// Name shown for a failed check run that has no name.
const UNNAMED_CHECK: &str = "Job";

/// Summarised CI state of a pull request head commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CiStatus {
    /// Every check passed, or the legacy status reports success.
    Success,
    /// Checks are running, absent, or inconclusive.
    Pending,
    /// At least one check run failed.
    Failure {
        /// Names of the failed check runs.
        failed_checks: Vec<String>,
    },
}

fn concluded(run: &CheckRun, conclusions: &[&str]) -> bool {
    run.conclusion
        .as_deref()
        .is_some_and(|conclusion| conclusions.contains(&conclusion))
}

fn is_running(run: &CheckRun) -> bool {
    run.status.as_deref() == Some("in_progress") || run.conclusion.is_none()
}

/// Classifies the CI state of a commit.
///
/// A failed check run wins over everything else. When any run is still
/// going, or there are no runs at all, the legacy combined status decides
/// between success and pending. Otherwise the commit is successful only if
/// every run concluded `success`, `neutral` or `skipped`.
#[must_use]
pub fn classify(status: &CommitStatus) -> CiStatus {
    let runs = &status.check_runs;

    let failed_checks: Vec<String> = runs
        .iter()
        .filter(|run| concluded(run, &["failure"]))
        .map(|run| {
            if run.name.trim().is_empty() {
                UNNAMED_CHECK.to_owned()
            } else {
                run.name.clone()
            }
        })
        .collect();
    if !failed_checks.is_empty() {
        return CiStatus::Failure { failed_checks };
    }

    if runs.is_empty() || runs.iter().any(is_running) {
        let legacy_success = status
            .legacy
            .as_ref()
            .is_some_and(|legacy| legacy.state == "success");
        return if legacy_success {
            CiStatus::Success
        } else {
            CiStatus::Pending
        };
    }

    if runs
        .iter()
        .all(|run| concluded(run, &["success", "neutral", "skipped"]))
    {
        CiStatus::Success
    } else {
        CiStatus::Pending
    }
}
