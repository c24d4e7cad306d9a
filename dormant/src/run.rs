//! One end-to-end run: fetch, normalize, rank, select, execute.

use chrono::NaiveDate;
use dormant_common::{DisableMode, FailurePolicy, OutcomeLog, OutcomeStatus};
use serde::Serialize;

use crate::directory::UserDirectory;
use crate::error::{Error, Result};
use crate::pipeline::{self, EligibilityStats, ExecutorOptions};

/// Everything a run needs; built from [`crate::Config`] by the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub threshold_days: i64,
    pub mode: DisableMode,
    pub apply: bool,
    pub failsafe_limit: Option<usize>,
    pub failure_policy: FailurePolicy,
    /// Processing date idle time is measured against
    pub today: NaiveDate,
}

/// What a run found and did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub mode: DisableMode,
    pub threshold_days: i64,
    pub apply: bool,
    pub failsafe_limit: Option<usize>,
    /// Users returned by the directory
    pub total_users: usize,
    pub stats: EligibilityStats,
    pub log: OutcomeLog,
}

impl RunSummary {
    fn new(options: &RunOptions, total_users: usize) -> Self {
        Self {
            mode: options.mode,
            threshold_days: options.threshold_days,
            apply: options.apply,
            failsafe_limit: options.failsafe_limit,
            total_users,
            stats: EligibilityStats::default(),
            log: OutcomeLog::new(),
        }
    }

    /// No user qualified; the run ended without touching anything.
    pub fn nothing_to_do(&self) -> bool {
        self.stats.eligible == 0
    }

    pub fn has_failures(&self) -> bool {
        self.log.failed() > 0
    }
}

/// Run the whole pipeline against `directory`.
///
/// Ends with `Ok` on success and on "nothing to do". A failed disable under
/// [`FailurePolicy::Halt`] ends with [`Error::UpdateHalted`], which carries
/// the summary up to the failure.
pub async fn run(directory: &dyn UserDirectory, options: &RunOptions) -> Result<RunSummary> {
    tracing::info!("Query {} for all users", directory.directory_type());
    let raw_users = directory.fetch_users().await.map_err(Error::Fetch)?;

    let users = pipeline::normalize(raw_users, options.today)?;
    tracing::info!("Found a total of <{}> users in this subscription", users.len());

    let mut summary = RunSummary::new(options, users.len());

    let ranked = pipeline::rank(users);
    let selection = pipeline::select(ranked, options.threshold_days, options.mode);
    summary.stats = selection.stats();

    if selection.is_empty() {
        tracing::info!("No eligible users found; nothing to do; exiting");
        return Ok(summary);
    }
    tracing::info!(
        "There are <{}> accounts eligible to be disabled",
        selection.len()
    );

    let executor_options = ExecutorOptions {
        apply: options.apply,
        failsafe_limit: options.failsafe_limit,
        failure_policy: options.failure_policy,
    };
    let execution = pipeline::execute(directory, &selection, &executor_options).await;
    summary.log = execution.log;

    if execution.halted {
        if let Some(failed) = summary.log.entries().last().cloned() {
            if let OutcomeStatus::Failed { detail } = failed.status {
                return Err(Error::UpdateHalted {
                    user: Box::new(failed.user),
                    detail,
                    summary: Box::new(summary),
                });
            }
        }
    }

    Ok(summary)
}
