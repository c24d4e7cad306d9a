//! Turn raw directory users into typed records with idle time.

use chrono::{DateTime, NaiveDate};
use dormant_common::{RawUser, UserRecord};

use crate::error::{Error, Result};

/// Normalize every fetched user as of `today`.
///
/// An empty fetch is fatal: a subscription always has at least the
/// account running the query.
pub fn normalize(raw_users: Vec<RawUser>, today: NaiveDate) -> Result<Vec<UserRecord>> {
    if raw_users.is_empty() {
        return Err(Error::EmptyFetch);
    }

    raw_users
        .into_iter()
        .map(|raw| normalize_user(raw, today))
        .collect()
}

fn normalize_user(raw: RawUser, today: NaiveDate) -> Result<UserRecord> {
    let created_on = parse_date_field(&raw, "CreationDate", &raw.created_at)?;

    // Blank and absent both mean "never logged in".
    let last_login_on = match raw.last_login_at.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(parse_date_field(&raw, "LastLoginDate", value)?),
    };

    let reference = last_login_on.unwrap_or(created_on);
    let idle_days = (today - reference).num_days();

    Ok(UserRecord {
        id: raw.id,
        username: raw.username,
        email: raw.email,
        created_on,
        last_login_on,
        subscription_permission: raw.subscription_permission.into(),
        disabled: raw.disabled,
        idle_days,
    })
}

fn parse_date_field(raw: &RawUser, field: &'static str, value: &str) -> Result<NaiveDate> {
    parse_calendar_date(value).ok_or_else(|| Error::InvalidDate {
        id: raw.id.clone(),
        username: raw.username.clone(),
        field,
        value: value.to_string(),
    })
}

/// Calendar date of an ISO-8601 timestamp, in the timestamp's own offset.
///
/// Accepts full RFC 3339 timestamps and anything starting with `YYYY-MM-DD`.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }
    NaiveDate::parse_from_str(value.get(..10)?, "%Y-%m-%d").ok()
}
