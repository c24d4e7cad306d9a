//! Disable executor: walks the selection and records what happened to each
//! user.

use dormant_common::{FailurePolicy, Outcome, OutcomeLog, OutcomeStatus, UserRecord};

use super::eligibility::EligibilitySelection;
use crate::directory::UserDirectory;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Issue disable calls; otherwise only plan them
    pub apply: bool,
    /// Users past this many positions are skipped, in both modes
    pub failsafe_limit: Option<usize>,
    pub failure_policy: FailurePolicy,
}

/// Result of walking the selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Execution {
    pub log: OutcomeLog,
    /// Set when a failure stopped the walk; the failing user is the last
    /// entry of `log`
    pub halted: bool,
}

/// Walk the selection in order.
///
/// Dry runs and applied runs visit users identically; the only difference
/// is whether the directory is called.
pub async fn execute(
    directory: &dyn UserDirectory,
    selection: &EligibilitySelection,
    options: &ExecutorOptions,
) -> Execution {
    let mut execution = Execution::default();

    for (index, user) in selection.users().iter().enumerate() {
        let position = index + 1;
        let mut user = user.clone();

        if options.failsafe_limit.is_some_and(|limit| index >= limit) {
            tracing::info!(
                username = %user.username,
                position,
                "Skipping this user because the failsafe limit was reached"
            );
            execution.log.push(Outcome {
                position,
                user,
                status: OutcomeStatus::SkippedByFailsafe,
            });
            continue;
        }

        if !options.apply {
            execution.log.push(Outcome {
                position,
                user,
                status: OutcomeStatus::Planned,
            });
            continue;
        }

        match disable(directory, &user).await {
            Ok(()) => {
                user.disabled = true;
                tracing::info!(
                    username = %user.username,
                    email = %user.email,
                    id = %user.id,
                    "Disabled user"
                );
                execution.log.push(Outcome {
                    position,
                    user,
                    status: OutcomeStatus::Disabled,
                });
            }
            Err(detail) => {
                tracing::error!(
                    username = %user.username,
                    email = %user.email,
                    id = %user.id,
                    "User could NOT be disabled: {}",
                    detail
                );
                execution.log.push(Outcome {
                    position,
                    user,
                    status: OutcomeStatus::Failed { detail },
                });
                if options.failure_policy == FailurePolicy::Halt {
                    execution.halted = true;
                    break;
                }
            }
        }
    }

    execution
}

/// One disable call; any error or an unconfirmed flag is a failure.
async fn disable(directory: &dyn UserDirectory, user: &UserRecord) -> Result<(), String> {
    let confirmation = directory
        .disable_user(&user.id)
        .await
        .map_err(|e| e.to_string())?;

    if confirmation.disabled {
        Ok(())
    } else {
        Err("directory did not confirm Disabled = true".to_string())
    }
}
