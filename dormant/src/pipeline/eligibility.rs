//! Eligibility filter: which ranked users may be disabled.

use dormant_common::{DisableMode, UserRecord};
use serde::Serialize;

/// Why a user was left out of the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    AlreadyDisabled,
    BelowThreshold,
    ExcludedByMode,
}

/// Per-reason counts; together they account for every ranked user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EligibilityStats {
    pub already_disabled: usize,
    pub below_threshold: usize,
    pub excluded_by_mode: usize,
    pub eligible: usize,
}

impl EligibilityStats {
    pub fn total(&self) -> usize {
        self.already_disabled + self.below_threshold + self.excluded_by_mode + self.eligible
    }
}

/// The users that passed the filter, in ranked order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EligibilitySelection {
    users: Vec<UserRecord>,
    stats: EligibilityStats,
}

impl EligibilitySelection {
    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn stats(&self) -> EligibilityStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Decide one user. Rules apply in order: disabled, idle threshold, mode.
pub fn classify(user: &UserRecord, threshold_days: i64, mode: DisableMode) -> Option<Exclusion> {
    if user.disabled {
        return Some(Exclusion::AlreadyDisabled);
    }
    if user.idle_days < threshold_days {
        return Some(Exclusion::BelowThreshold);
    }
    if !mode_admits(mode, user) {
        return Some(Exclusion::ExcludedByMode);
    }
    None
}

fn mode_admits(mode: DisableMode, user: &UserRecord) -> bool {
    match mode {
        DisableMode::General => true,
        DisableMode::NoAccess => user.subscription_permission.is_no_access(),
        DisableMode::BlankLastLogin => user.has_never_logged_in(),
    }
}

/// Filter the ranked users down to the eligible ones.
pub fn select(ranked: Vec<UserRecord>, threshold_days: i64, mode: DisableMode) -> EligibilitySelection {
    let mut selection = EligibilitySelection::default();

    for user in ranked {
        match classify(&user, threshold_days, mode) {
            None => {
                selection.stats.eligible += 1;
                selection.users.push(user);
            }
            Some(reason) => {
                tracing::trace!(username = %user.username, idle_days = user.idle_days, ?reason, "Excluded user");
                match reason {
                    Exclusion::AlreadyDisabled => selection.stats.already_disabled += 1,
                    Exclusion::BelowThreshold => selection.stats.below_threshold += 1,
                    Exclusion::ExcludedByMode => selection.stats.excluded_by_mode += 1,
                }
            }
        }
    }

    selection
}
