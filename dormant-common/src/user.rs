//! User account types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A user exactly as the directory returned it.
///
/// Timestamps stay as strings here; the selection pipeline parses them into
/// calendar dates when it builds a [`UserRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    /// Opaque directory identifier (Rally ObjectID)
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// ISO-8601 creation timestamp
    pub created_at: String,
    /// ISO-8601 last login timestamp, absent if the user never logged in
    #[serde(default)]
    pub last_login_at: Option<String>,
    #[serde(default)]
    pub subscription_permission: String,
    #[serde(default)]
    pub disabled: bool,
}

/// Subscription-level permission of a user.
///
/// Only "No Access" drives any decision, every other value is carried through
/// for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionPermission {
    NoAccess,
    Other(String),
}

impl SubscriptionPermission {
    pub const NO_ACCESS: &'static str = "No Access";

    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionPermission::NoAccess => Self::NO_ACCESS,
            SubscriptionPermission::Other(value) => value,
        }
    }

    pub fn is_no_access(&self) -> bool {
        matches!(self, SubscriptionPermission::NoAccess)
    }
}

impl From<String> for SubscriptionPermission {
    fn from(value: String) -> Self {
        if value == Self::NO_ACCESS {
            SubscriptionPermission::NoAccess
        } else {
            SubscriptionPermission::Other(value)
        }
    }
}

impl From<&str> for SubscriptionPermission {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl From<SubscriptionPermission> for String {
    fn from(permission: SubscriptionPermission) -> Self {
        permission.as_str().to_string()
    }
}

impl std::fmt::Display for SubscriptionPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized user with its idle time computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Calendar date the account was created
    pub created_on: NaiveDate,
    /// Calendar date of the last login, `None` if the user never logged in
    pub last_login_on: Option<NaiveDate>,
    pub subscription_permission: SubscriptionPermission,
    pub disabled: bool,
    /// Days between the processing date and [`UserRecord::reference_date`]
    pub idle_days: i64,
}

impl UserRecord {
    pub fn has_never_logged_in(&self) -> bool {
        self.last_login_on.is_none()
    }

    /// The date idle time is measured from: last login, or creation when the
    /// user never logged in.
    pub fn reference_date(&self) -> NaiveDate {
        self.last_login_on.unwrap_or(self.created_on)
    }
}
