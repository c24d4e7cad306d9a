//! Candidate ordering.
//!
//! Users who never logged in come first, then users by last login, oldest
//! first. Ties go to the older account: reclaiming a seat from an account
//! held for years beats reclaiming one created yesterday.

use chrono::NaiveDate;
use dormant_common::UserRecord;

/// Last login as a sort key. `Never` orders before any date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LastLogin {
    Never,
    On(NaiveDate),
}

/// Composite ranking key; lower ranks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RankKey {
    pub last_login: LastLogin,
    pub created_on: NaiveDate,
}

impl RankKey {
    pub fn of(user: &UserRecord) -> Self {
        Self {
            last_login: user.last_login_on.map_or(LastLogin::Never, LastLogin::On),
            created_on: user.created_on,
        }
    }
}

/// Order all users, most idle first. Equal keys keep their input order.
pub fn rank(mut users: Vec<UserRecord>) -> Vec<UserRecord> {
    users.sort_by_key(RankKey::of);
    users
}
