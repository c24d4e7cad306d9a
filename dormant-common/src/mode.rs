//! Run modes: which idle accounts qualify, and what to do when a disable fails.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseModeError {
    #[error("Unknown disable mode '{0}' (expected general, No-Access or Blank-Last-Login)")]
    UnknownMode(String),
    #[error("Unknown failure policy '{0}' (expected halt or continue)")]
    UnknownPolicy(String),
}

/// Extra gate applied to idle accounts before they become eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DisableMode {
    /// Every idle, enabled account is eligible
    #[default]
    General,
    /// Only idle accounts whose subscription permission is "No Access"
    NoAccess,
    /// Only idle accounts that never logged in
    BlankLastLogin,
}

impl DisableMode {
    /// All mode variants for iteration.
    pub const ALL: [DisableMode; 3] = [
        DisableMode::General,
        DisableMode::NoAccess,
        DisableMode::BlankLastLogin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisableMode::General => "general",
            DisableMode::NoAccess => "No-Access",
            DisableMode::BlankLastLogin => "Blank-Last-Login",
        }
    }
}

impl std::fmt::Display for DisableMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisableMode {
    type Err = ParseModeError;

    /// Accepts the spellings of the `--type` flag, case-insensitively, with
    /// either `-` or `_` as separator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "general" | "" => Ok(DisableMode::General),
            "no-access" => Ok(DisableMode::NoAccess),
            "blank-last-login" => Ok(DisableMode::BlankLastLogin),
            _ => Err(ParseModeError::UnknownMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for DisableMode {
    type Error = ParseModeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DisableMode> for String {
    fn from(mode: DisableMode) -> Self {
        mode.as_str().to_string()
    }
}

/// What the executor does after a disable attempt fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FailurePolicy {
    /// Stop at the first failure; remaining candidates are left untouched
    #[default]
    Halt,
    /// Record the failure and move on to the next candidate
    Continue,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Halt => "halt",
            FailurePolicy::Continue => "continue",
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "halt" => Ok(FailurePolicy::Halt),
            "continue" => Ok(FailurePolicy::Continue),
            _ => Err(ParseModeError::UnknownPolicy(s.to_string())),
        }
    }
}

impl TryFrom<String> for FailurePolicy {
    type Error = ParseModeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FailurePolicy> for String {
    fn from(policy: FailurePolicy) -> Self {
        policy.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disable_mode_parses_flag_spellings() {
        assert_eq!("No-Access".parse(), Ok(DisableMode::NoAccess));
        assert_eq!("no_access".parse(), Ok(DisableMode::NoAccess));
        assert_eq!("Blank-Last-Login".parse(), Ok(DisableMode::BlankLastLogin));
        assert_eq!("GENERAL".parse(), Ok(DisableMode::General));
    }

    #[test]
    fn test_disable_mode_rejects_unknown() {
        let err = "Full".parse::<DisableMode>().unwrap_err();
        assert_eq!(err, ParseModeError::UnknownMode("Full".to_string()));
        assert!(err.to_string().contains("No-Access"));
    }

    #[test]
    fn test_disable_mode_display_roundtrips() {
        for mode in DisableMode::ALL {
            assert_eq!(mode.to_string().parse::<DisableMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_disable_mode_deserialize() {
        let mode: DisableMode = serde_json::from_str(r#""blank-last-login""#).unwrap();
        assert_eq!(mode, DisableMode::BlankLastLogin);
        assert!(serde_json::from_str::<DisableMode>(r#""sometimes""#).is_err());
    }

    #[test]
    fn test_failure_policy_default_is_halt() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Halt);
        assert_eq!("Continue".parse(), Ok(FailurePolicy::Continue));
        assert!("retry".parse::<FailurePolicy>().is_err());
    }
}
