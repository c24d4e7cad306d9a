//! End-to-end runs against an in-memory directory.

use chrono::NaiveDate;
use dormant::test_util::{raw_user, MemoryDirectory};
use dormant::{run, Error, RunOptions};
use dormant_common::{DisableMode, FailurePolicy, OutcomeStatus, RawUser};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn options(threshold_days: i64, mode: DisableMode, apply: bool) -> RunOptions {
    RunOptions {
        threshold_days,
        mode,
        apply,
        failsafe_limit: None,
        failure_policy: FailurePolicy::Halt,
        today: today(),
    }
}

fn with_permission(mut user: RawUser, permission: &str) -> RawUser {
    user.subscription_permission = permission.to_string();
    user
}

fn disabled(mut user: RawUser) -> RawUser {
    user.disabled = true;
    user
}

/// Five users, two of them eligible at 90 days in general mode.
fn five_users() -> Vec<RawUser> {
    vec![
        // Active last week
        raw_user("101", "2018-05-01T10:00:00.000Z", Some("2024-02-23T09:00:00.000Z")),
        // Idle since 2023-06-01 (274 days)
        raw_user("102", "2017-03-10T10:00:00.000Z", Some("2023-06-01T12:00:00.000Z")),
        // Idle but already disabled
        disabled(raw_user("103", "2016-01-01T10:00:00.000Z", Some("2022-01-01T12:00:00.000Z"))),
        // Never logged in, created 2022
        raw_user("104", "2022-07-15T10:00:00.000Z", None),
        // Created 30 days ago, never logged in
        raw_user("105", "2024-01-31T10:00:00.000Z", None),
    ]
}

fn outcome_ids(log: &dormant_common::OutcomeLog) -> Vec<String> {
    log.iter().map(|o| o.user.id.clone()).collect()
}

#[tokio::test]
async fn test_general_mode_disables_two_eligible_users() {
    let directory = MemoryDirectory::new(five_users());

    let summary = run(&directory, &options(90, DisableMode::General, true))
        .await
        .unwrap();

    // Never-logged-in first, then by last login
    assert_eq!(outcome_ids(&summary.log), vec!["104", "102"]);
    assert_eq!(directory.disable_calls(), vec!["104", "102"]);
    assert_eq!(summary.log.disabled(), 2);
    assert!(summary.log.iter().all(|o| o.success() && o.user.disabled));

    assert_eq!(summary.total_users, 5);
    assert_eq!(summary.stats.eligible, 2);
    assert_eq!(summary.stats.already_disabled, 1);
    assert_eq!(summary.stats.below_threshold, 2);
}

#[tokio::test]
async fn test_no_access_mode_selects_only_no_access() {
    let directory = MemoryDirectory::new(vec![
        with_permission(
            raw_user("201", "2019-01-01T00:00:00.000Z", Some("2023-11-01T00:00:00.000Z")),
            "No Access",
        ),
        with_permission(
            raw_user("202", "2019-01-01T00:00:00.000Z", Some("2023-10-01T00:00:00.000Z")),
            "Full",
        ),
    ]);

    let summary = run(&directory, &options(30, DisableMode::NoAccess, true))
        .await
        .unwrap();

    assert_eq!(outcome_ids(&summary.log), vec!["201"]);
    assert_eq!(directory.disable_calls(), vec!["201"]);
    assert_eq!(summary.stats.excluded_by_mode, 1);
}

#[tokio::test]
async fn test_blank_login_mode_selects_only_never_logged_in() {
    let directory = MemoryDirectory::new(five_users());

    let summary = run(&directory, &options(20, DisableMode::BlankLastLogin, false))
        .await
        .unwrap();

    assert_eq!(outcome_ids(&summary.log), vec!["104", "105"]);
    assert!(summary
        .log
        .iter()
        .all(|o| o.user.last_login_on.is_none()));
}

#[tokio::test]
async fn test_nothing_to_do_when_all_below_threshold() {
    let directory = MemoryDirectory::new(five_users());

    let summary = run(&directory, &options(5000, DisableMode::General, true))
        .await
        .unwrap();

    assert!(summary.nothing_to_do());
    assert!(summary.log.is_empty());
    assert!(directory.disable_calls().is_empty());
    assert_eq!(summary.stats.below_threshold, 4);
}

#[tokio::test]
async fn test_empty_fetch_halts_before_selection() {
    let directory = MemoryDirectory::new(vec![]);

    let result = run(&directory, &options(90, DisableMode::General, true)).await;

    assert!(matches!(result, Err(Error::EmptyFetch)));
    assert!(directory.disable_calls().is_empty());
}

#[tokio::test]
async fn test_dry_run_and_apply_plan_the_same_users() {
    let dry_directory = MemoryDirectory::new(five_users());
    let apply_directory = MemoryDirectory::new(five_users());

    let dry = run(&dry_directory, &options(90, DisableMode::General, false))
        .await
        .unwrap();
    let applied = run(&apply_directory, &options(90, DisableMode::General, true))
        .await
        .unwrap();

    assert_eq!(outcome_ids(&dry.log), outcome_ids(&applied.log));
    assert_eq!(dry.stats, applied.stats);
    assert!(dry_directory.disable_calls().is_empty());
    assert!(dry.log.iter().all(|o| o.status == OutcomeStatus::Planned && !o.user.disabled));
    assert!(applied.log.iter().all(|o| o.status == OutcomeStatus::Disabled));
}

#[tokio::test]
async fn test_failsafe_limits_update_calls() {
    let users = (1..=6)
        .map(|i| raw_user(&i.to_string(), &format!("2015-0{}-01", i), None))
        .collect();
    let directory = MemoryDirectory::new(users);
    let mut run_options = options(90, DisableMode::General, true);
    run_options.failsafe_limit = Some(4);

    let summary = run(&directory, &run_options).await.unwrap();

    assert_eq!(directory.disable_calls(), vec!["1", "2", "3", "4"]);
    assert_eq!(summary.log.disabled(), 4);
    assert_eq!(summary.log.skipped(), 2);
    let skipped: Vec<usize> = summary
        .log
        .iter()
        .filter(|o| o.status == OutcomeStatus::SkippedByFailsafe)
        .map(|o| o.position)
        .collect();
    assert_eq!(skipped, vec![5, 6]);
}

#[tokio::test]
async fn test_failsafe_dry_run_matches_apply_plan() {
    let users: Vec<RawUser> = (1..=6)
        .map(|i| raw_user(&i.to_string(), &format!("2015-0{}-01", i), None))
        .collect();
    let dry_directory = MemoryDirectory::new(users.clone());
    let apply_directory = MemoryDirectory::new(users);

    let mut dry_options = options(90, DisableMode::General, false);
    dry_options.failsafe_limit = Some(4);
    let mut apply_options = dry_options.clone();
    apply_options.apply = true;

    let dry = run(&dry_directory, &dry_options).await.unwrap();
    let applied = run(&apply_directory, &apply_options).await.unwrap();

    assert!(dry_directory.disable_calls().is_empty());
    assert_eq!(dry.log.planned(), 4);
    assert_eq!(dry.log.skipped(), 2);
    let statuses = |log: &dormant_common::OutcomeLog| -> Vec<(usize, bool)> {
        log.iter()
            .map(|o| (o.position, o.status == OutcomeStatus::SkippedByFailsafe))
            .collect()
    };
    assert_eq!(statuses(&dry.log), statuses(&applied.log));
    assert_eq!(outcome_ids(&dry.log), outcome_ids(&applied.log));
}

#[tokio::test]
async fn test_continue_policy_reports_all_failures() {
    let directory = MemoryDirectory::new(five_users())
        .failing("104", "Not authorized to update user");
    let mut run_options = options(90, DisableMode::General, true);
    run_options.failure_policy = FailurePolicy::Continue;

    let summary = run(&directory, &run_options).await.unwrap();

    assert!(summary.has_failures());
    assert_eq!(directory.disable_calls(), vec!["104", "102"]);
    assert_eq!(summary.log.failed(), 1);
    assert_eq!(summary.log.disabled(), 1);
}

#[tokio::test]
async fn test_halt_policy_stops_at_unconfirmed_update() {
    let directory = MemoryDirectory::new(five_users()).unconfirmed("104");

    match run(&directory, &options(90, DisableMode::General, true)).await {
        Err(Error::UpdateHalted { user, summary, .. }) => {
            assert_eq!(user.id, "104");
            assert_eq!(summary.log.len(), 1);
            assert_eq!(summary.stats.already_disabled, 1);
        }
        other => panic!("expected UpdateHalted, got {:?}", other),
    }
    assert_eq!(directory.disable_calls(), vec!["104"]);
}

#[tokio::test]
async fn test_invalid_date_is_fatal() {
    let directory = MemoryDirectory::new(vec![raw_user("1", "not a date", None)]);

    let result = run(&directory, &options(90, DisableMode::General, false)).await;

    assert!(matches!(
        result,
        Err(Error::InvalidDate { field: "CreationDate", .. })
    ));
}
