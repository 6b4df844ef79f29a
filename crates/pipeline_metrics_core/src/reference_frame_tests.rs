//! Tests for the reference frame fold and duration arithmetic.

use super::*;
use chrono::TimeZone;
use tracing_test::traced_test;

use ExecutionStatus::{Failed, Succeeded};

fn at(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).unwrap()
}

fn exec(id: &str, status: ExecutionStatus, start: i64, end: i64) -> Execution {
    Execution::new(id, status, Some(at(start)), Some(at(end)))
}

fn ids(execution: Option<&Execution>) -> Option<&str> {
    execution.map(|e| e.id.as_str())
}

#[test]
fn test_new_frame_is_searching() {
    let frame = ReferenceFrame::new("xxx");

    assert_eq!(frame.state(), FoldState::Searching);
    assert_eq!(frame.current_execution_id(), "xxx");
    assert!(frame.current_execution().is_none());
    assert!(!frame.is_final());
}

#[test]
fn test_entries_before_current_are_skipped() {
    let mut frame = ReferenceFrame::new("xxx");

    frame.fold_page(vec![
        exec("newer", Failed, 1_000, 2_000),
        exec("xxx", Succeeded, 500, 900),
    ]);

    assert_eq!(ids(frame.current_execution()), Some("xxx"));
    assert!(frame.prior_state_execution().is_none());
    assert!(frame.prior_success_execution().is_none());
    assert_eq!(ids(frame.prior_success_plus_one_execution()), Some("xxx"));
    assert_eq!(frame.state(), FoldState::Tracking(Succeeded));
}

#[test]
fn test_success_after_success_is_final() {
    let mut frame = ReferenceFrame::new("xxx");

    frame.fold_page(vec![
        exec("xxx", Succeeded, 907_000, 1_007_000),
        exec("aaa", Succeeded, 207_000, 407_000),
    ]);

    assert!(frame.is_final());
    assert_eq!(frame.state(), FoldState::Final);
    assert_eq!(ids(frame.prior_success_execution()), Some("aaa"));
    assert_eq!(ids(frame.prior_success_plus_one_execution()), Some("xxx"));
    assert!(frame.prior_state_execution().is_none());
}

#[test]
fn test_failed_run_before_success_moves_window_start_to_oldest_failure() {
    let mut frame = ReferenceFrame::new("xxx");

    frame.fold_page(vec![
        exec("xxx", Succeeded, 907_000, 1_007_000),
        exec("yyy", Failed, 707_000, 807_000),
        exec("zzz", Failed, 507_000, 607_000),
        exec("aaa", Succeeded, 207_000, 407_000),
    ]);

    assert!(frame.is_final());
    assert_eq!(ids(frame.prior_state_execution()), Some("zzz"));
    assert_eq!(ids(frame.prior_success_execution()), Some("aaa"));
    assert_eq!(ids(frame.prior_success_plus_one_execution()), Some("zzz"));
}

#[test]
fn test_failed_current_tracks_prior_state_only() {
    let mut frame = ReferenceFrame::new("xxx");

    frame.fold_page(vec![
        exec("xxx", Failed, 907_000, 1_007_000),
        exec("yyy", Succeeded, 807_000, 857_000),
        exec("zzz", Succeeded, 507_000, 607_000),
        exec("aaa", Failed, 107_000, 207_000),
    ]);

    assert!(frame.is_final());
    assert_eq!(ids(frame.prior_state_execution()), Some("zzz"));
    assert!(frame.prior_success_execution().is_none());
    assert!(frame.prior_success_plus_one_execution().is_none());
}

#[test]
fn test_fold_stops_consuming_once_final() {
    let mut frame = ReferenceFrame::new("xxx");

    let consumed = frame.fold_page(vec![
        exec("xxx", Failed, 907_000, 1_007_000),
        exec("yyy", Failed, 807_000, 857_000),
        exec("zzz", Succeeded, 507_000, 607_000),
        exec("aaa", Failed, 107_000, 207_000),
    ]);

    assert_eq!(consumed, 2);
    assert!(frame.prior_state_execution().is_none());
}

#[test]
fn test_final_frame_ignores_later_pages() {
    let mut frame = ReferenceFrame::new("xxx");
    frame.fold_page(vec![
        exec("xxx", Succeeded, 907_000, 1_007_000),
        exec("aaa", Succeeded, 207_000, 407_000),
    ]);
    let before = frame.clone();

    let consumed = frame.fold_page(vec![exec("bbb", Failed, 7_000, 8_000)]);

    assert_eq!(consumed, 0);
    assert_eq!(frame, before);
}

#[test]
fn test_fold_continues_across_pages() {
    let mut frame = ReferenceFrame::new("xxx");

    frame.fold_page(vec![
        exec("xxx", Succeeded, 907_000, 1_007_000),
        exec("yyy", Failed, 707_000, 807_000),
    ]);
    assert!(!frame.is_final());

    frame.fold_page(vec![exec("aaa", Succeeded, 207_000, 407_000)]);

    assert!(frame.is_final());
    assert_eq!(ids(frame.prior_state_execution()), Some("yyy"));
    assert_eq!(ids(frame.prior_success_plus_one_execution()), Some("yyy"));
}

#[test]
fn test_missing_current_leaves_frame_empty() {
    let mut frame = ReferenceFrame::new("missing");

    frame.fold_page(vec![
        exec("xxx", Succeeded, 907_000, 1_007_000),
        exec("aaa", Succeeded, 207_000, 407_000),
    ]);

    assert_eq!(frame.state(), FoldState::Searching);
    assert!(frame.current_execution().is_none());
    assert!(frame.prior_state_execution().is_none());
    assert!(frame.prior_success_execution().is_none());
    assert!(frame.prior_success_plus_one_execution().is_none());
}

#[test]
#[traced_test]
fn test_duplicate_current_id_keeps_first_match() {
    let mut frame = ReferenceFrame::new("xxx");

    frame.fold_page(vec![
        exec("xxx", Succeeded, 907_000, 1_007_000),
        exec("xxx", Failed, 1, 2),
        exec("yyy", Failed, 707_000, 807_000),
    ]);

    let current = frame.current_execution().unwrap();
    assert_eq!(current.status, Succeeded);
    assert_eq!(current.start_time, Some(at(907_000)));
    assert_eq!(ids(frame.prior_state_execution()), Some("yyy"));
    assert!(!frame.is_final());
    assert!(logs_contain("more than once"));
}

#[test]
fn test_fold_is_deterministic() {
    let history = vec![
        exec("xxx", Succeeded, 907_000, 1_007_000),
        exec("yyy", Failed, 707_000, 807_000),
        exec("aaa", Succeeded, 207_000, 407_000),
    ];

    let mut first = ReferenceFrame::new("xxx");
    first.fold_page(history.clone());
    let mut second = ReferenceFrame::new("xxx");
    second.fold_page(history);

    assert_eq!(first, second);
}

#[test]
fn test_duration_seconds_whole_values() {
    assert_eq!(duration_seconds(at(907_000), at(1_007_000)), 100);
    assert_eq!(duration_seconds(at(407_000), at(1_007_000)), 600);
    assert_eq!(duration_seconds(at(5_000), at(5_000)), 0);
}

#[test]
fn test_duration_seconds_rounds_half_up() {
    assert_eq!(duration_seconds(at(0), at(1_499)), 1);
    assert_eq!(duration_seconds(at(0), at(1_500)), 2);
    assert_eq!(duration_seconds(at(0), at(-1_500)), -1);
    assert_eq!(duration_seconds(at(0), at(-1_501)), -2);
}

#[test]
fn test_duration_seconds_passes_negative_spans_through() {
    assert_eq!(duration_seconds(at(1_007_000), at(907_000)), -100);
}

#[test]
fn test_optional_duration_requires_both_instants() {
    assert_eq!(
        optional_duration_seconds(Some(at(0)), Some(at(60_000))),
        Some(60)
    );
    assert_eq!(optional_duration_seconds(None, Some(at(60_000))), None);
    assert_eq!(optional_duration_seconds(Some(at(0)), None), None);
}
