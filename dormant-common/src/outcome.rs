//! Per-user results of a disable run.

use serde::Serialize;

use crate::user::UserRecord;

/// What happened to one eligible user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum OutcomeStatus {
    /// Dry run: the user would have been disabled
    Planned,
    /// The directory confirmed the user is now disabled
    Disabled,
    /// The disable call errored or was not confirmed
    Failed {
        /// Error detail from the directory or the confirmation check
        detail: String,
    },
    /// Left untouched because the failsafe limit was reached
    SkippedByFailsafe,
}

/// One entry of the [`OutcomeLog`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// 1-based position of the user in the eligibility selection
    pub position: usize,
    pub user: UserRecord,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl Outcome {
    pub fn success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Disabled)
    }

    pub fn error_detail(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Failed { detail } => Some(detail),
            _ => None,
        }
    }
}

/// Append-only record of what the executor did, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OutcomeLog {
    entries: Vec<Outcome>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: Outcome) {
        self.entries.push(outcome);
    }

    pub fn entries(&self) -> &[Outcome] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outcome> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn planned(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Planned))
    }

    pub fn disabled(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Disabled))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::SkippedByFailsafe))
    }

    /// Number of disable calls issued (successful or not).
    pub fn attempted(&self) -> usize {
        self.disabled() + self.failed()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.entries
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.entries.iter().filter(|o| predicate(&o.status)).count()
    }
}

impl<'a> IntoIterator for &'a OutcomeLog {
    type Item = &'a Outcome;
    type IntoIter = std::slice::Iter<'a, Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
