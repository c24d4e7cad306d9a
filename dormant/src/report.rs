//! Human-readable run report: criteria preamble, user table, summary.
//!
//! Everything is emitted through `tracing`, so the report lands on the
//! console and in the run log file alike.

use dormant_common::{DisableMode, Outcome, OutcomeStatus, UserRecord};

use crate::run::RunSummary;

/// Criteria preamble printed before a dry run.
pub fn criteria_lines(mode: DisableMode, threshold_days: i64) -> Vec<String> {
    let mut lines = vec![
        "The following are 'Enabled' user accounts which have either:".to_string(),
        format!(
            "    - a LastLoginDate (or CreationDate if LastLoginDate was blank) greater than or equal to '{}' days",
            threshold_days
        ),
        format!(
            "    - or never logged on and were created more than '{}' days ago",
            threshold_days
        ),
    ];
    match mode {
        DisableMode::General => {}
        DisableMode::NoAccess => lines.push("    - and the user has No-Access".to_string()),
        DisableMode::BlankLastLogin => {
            lines.push("    - and the LastLoginDate was blank".to_string())
        }
    }
    lines
}

fn columns(cells: [&str; 9]) -> String {
    format!(
        "{:<3} {:<33} {:<33} {:<10} {:<10} {:>4} {:>14} {:>9} {}",
        cells[0], cells[1], cells[2], cells[3], cells[4], cells[5], cells[6], cells[7], cells[8]
    )
    .trim_end()
    .to_string()
}

/// Rule, two title rows, rule.
pub fn header_lines() -> [String; 4] {
    let rule = [3, 33, 33, 10, 10, 4, 14, 9, 8]
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join(" ");
    [
        rule.clone(),
        columns([
            "", "User", "Email", "Creation", "LastLogin", "Days", "Subscription", "Disabled?", "Outcome",
        ]),
        columns(["", "Name", "Address", "Date", "Date", "Idle", "Permission", "", ""]),
        rule,
    ]
}

fn status_label(status: &OutcomeStatus) -> &'static str {
    match status {
        OutcomeStatus::Planned => "planned",
        OutcomeStatus::Disabled => "disabled",
        OutcomeStatus::Failed { .. } => "FAILED",
        OutcomeStatus::SkippedByFailsafe => "skipped",
    }
}

/// One table row. A user who never logged in gets a blank LastLogin column.
pub fn format_row(outcome: &Outcome) -> String {
    let user = &outcome.user;
    let created = user.created_on.format("%Y-%m-%d").to_string();
    let last_login = user
        .last_login_on
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    columns([
        &outcome.position.to_string(),
        &user.username,
        &user.email,
        &created,
        &last_login,
        &user.idle_days.to_string(),
        user.subscription_permission.as_str(),
        if user.disabled { "true" } else { "false" },
        status_label(&outcome.status),
    ])
}

pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let stats = &summary.stats;
    let log = &summary.log;
    let mut lines = vec![
        format!(
            "Run summary (mode {}, threshold {} days, {}):",
            summary.mode,
            summary.threshold_days,
            if summary.apply { "apply" } else { "dry run" }
        ),
        format!("\tUsers fetched       : {}", summary.total_users),
        format!("\tAlready disabled    : {}", stats.already_disabled),
        format!("\tBelow threshold     : {}", stats.below_threshold),
        format!("\tExcluded by mode    : {}", stats.excluded_by_mode),
        format!("\tEligible            : {}", stats.eligible),
    ];
    if summary.apply {
        lines.push(format!("\tDisabled            : {}", log.disabled()));
        lines.push(format!("\tFailed              : {}", log.failed()));
    } else {
        lines.push(format!("\tWould disable       : {}", log.planned()));
    }
    lines.push(format!("\tSkipped by failsafe : {}", log.skipped()));
    lines
}

/// One error line per failed disable, leaving out `halted_on`, which
/// [`log_halt`] reports on its own.
pub fn failure_lines(summary: &RunSummary, halted_on: Option<&UserRecord>) -> Vec<String> {
    summary
        .log
        .failures()
        .filter(|failure| halted_on.map_or(true, |user| user.id != failure.user.id))
        .filter_map(|failure| {
            failure.error_detail().map(|detail| {
                format!(
                    "ERROR:\tuser could NOT be disabled: Username:<{}>,  EmailAddress:<{}>,  ObjectID:<{}>: {}",
                    failure.user.username, failure.user.email, failure.user.id, detail
                )
            })
        })
        .collect()
}

/// Log the user table (when there is one), the summary and the failures.
pub fn log_report(summary: &RunSummary, halted_on: Option<&UserRecord>) {
    if !summary.log.is_empty() {
        tracing::info!(" ");
        if summary.apply {
            tracing::info!("THE FOLLOWING USERS WERE PROCESSED!!");
            tracing::info!(" ");
        }
        log_lines(header_lines().iter());
        log_lines(summary.log.iter().map(format_row).collect::<Vec<_>>().iter());
        log_lines(header_lines().iter());
        tracing::info!(" ");
    }
    log_lines(summary_lines(summary).iter());

    for line in failure_lines(summary, halted_on) {
        tracing::error!("{}", line);
    }
}

/// Explain a halted run: which user stopped it and what was done before.
pub fn halt_lines(user: &UserRecord, detail: &str, summary: &RunSummary) -> Vec<String> {
    let not_attempted = summary.stats.eligible.saturating_sub(summary.log.len());
    vec![
        format!(
            "Run halted: could not disable Username:<{}>,  EmailAddress:<{}>,  ObjectID:<{}>",
            user.username, user.email, user.id
        ),
        format!("\tReason: {}", detail),
        format!(
            "\tBefore the halt: {} disabled, {} skipped by failsafe, {} already disabled; {} eligible users not attempted",
            summary.log.disabled(),
            summary.log.skipped(),
            summary.stats.already_disabled,
            not_attempted
        ),
    ]
}

pub fn log_halt(user: &UserRecord, detail: &str, summary: &RunSummary) {
    for line in halt_lines(user, detail, summary) {
        tracing::error!("{}", line);
    }
}

fn log_lines<'a>(lines: impl Iterator<Item = &'a String>) {
    for line in lines {
        tracing::info!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::EligibilityStats;
    use chrono::NaiveDate;
    use dormant_common::{OutcomeLog, SubscriptionPermission};

    fn outcome(last_login_on: Option<NaiveDate>, status: OutcomeStatus) -> Outcome {
        Outcome {
            position: 1,
            user: UserRecord {
                id: "12345".to_string(),
                username: "jdoe@example.com".to_string(),
                email: "jdoe@example.com".to_string(),
                created_on: NaiveDate::from_ymd_opt(2019, 4, 2).unwrap(),
                last_login_on,
                subscription_permission: SubscriptionPermission::NoAccess,
                disabled: false,
                idle_days: 1795,
            },
            status,
        }
    }

    fn summary(apply: bool, log: OutcomeLog) -> RunSummary {
        RunSummary {
            mode: DisableMode::NoAccess,
            threshold_days: 90,
            apply,
            failsafe_limit: None,
            total_users: 5,
            stats: EligibilityStats {
                already_disabled: 1,
                below_threshold: 1,
                excluded_by_mode: 0,
                eligible: 3,
            },
            log,
        }
    }

    #[test]
    fn test_header_and_row_align() {
        let header = header_lines();
        let row = format_row(&outcome(
            Some(NaiveDate::from_ymd_opt(2019, 5, 1).unwrap()),
            OutcomeStatus::Planned,
        ));

        // Idle days column ends where the "Days" title ends
        let days_end = header[1].find("Days").unwrap() + "Days".len();
        assert_eq!(&row[days_end - 4..days_end], "1795");
        assert!(row.starts_with("1   jdoe@example.com"));
        assert!(row.contains("2019-04-02 2019-05-01"));
        assert!(row.ends_with("planned"));
        assert_eq!(header[0].len(), header[3].len());
    }

    #[test]
    fn test_row_blank_last_login() {
        let row = format_row(&outcome(None, OutcomeStatus::SkippedByFailsafe));
        assert!(row.contains("2019-04-02            1795"));
        assert!(row.ends_with("skipped"));
    }

    #[test]
    fn test_criteria_lines_by_mode() {
        assert_eq!(criteria_lines(DisableMode::General, 90).len(), 3);

        let no_access = criteria_lines(DisableMode::NoAccess, 30);
        assert!(no_access[1].contains("'30' days"));
        assert!(no_access.last().unwrap().contains("No-Access"));

        let blank = criteria_lines(DisableMode::BlankLastLogin, 30);
        assert!(blank.last().unwrap().contains("LastLoginDate was blank"));
    }

    #[test]
    fn test_summary_lines_dry_run() {
        let mut log = OutcomeLog::new();
        log.push(outcome(None, OutcomeStatus::Planned));
        let lines = summary_lines(&summary(false, log));

        assert!(lines[0].contains("dry run"));
        assert!(lines.iter().any(|l| l.contains("Would disable       : 1")));
        assert!(!lines.iter().any(|l| l.contains("Failed")));
    }

    #[test]
    fn test_summary_lines_apply() {
        let mut log = OutcomeLog::new();
        log.push(outcome(None, OutcomeStatus::Disabled));
        log.push(outcome(None, OutcomeStatus::Failed { detail: "x".to_string() }));
        let lines = summary_lines(&summary(true, log));

        assert!(lines.iter().any(|l| l.contains("Disabled            : 1")));
        assert!(lines.iter().any(|l| l.contains("Failed              : 1")));
        assert!(lines.iter().any(|l| l.contains("Already disabled    : 1")));
    }

    #[test]
    fn test_failure_lines_leave_out_halting_user() {
        let mut log = OutcomeLog::new();
        let mut earlier = outcome(None, OutcomeStatus::Failed { detail: "timeout".to_string() });
        earlier.user.id = "111".to_string();
        log.push(earlier);
        let halting = outcome(None, OutcomeStatus::Failed { detail: "rejected".to_string() });
        log.push(halting.clone());
        let summary = summary(true, log);

        let all = failure_lines(&summary, None);
        assert_eq!(all.len(), 2);

        let without_halt = failure_lines(&summary, Some(&halting.user));
        assert_eq!(without_halt.len(), 1);
        assert!(without_halt[0].contains("ObjectID:<111>"));
        assert!(without_halt[0].contains("timeout"));
    }

    #[test]
    fn test_halt_lines() {
        let mut log = OutcomeLog::new();
        log.push(outcome(None, OutcomeStatus::Disabled));
        let failed = outcome(None, OutcomeStatus::Failed { detail: "rejected".to_string() });
        log.push(failed.clone());

        let lines = halt_lines(&failed.user, "rejected", &summary(true, log));
        assert!(lines[0].contains("ObjectID:<12345>"));
        assert!(lines[1].contains("rejected"));
        assert!(lines[2].contains("1 disabled"));
        assert!(lines[2].contains("1 eligible users not attempted"));
    }
}
