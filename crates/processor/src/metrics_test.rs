use chrono::Duration;
use common::models::ProgressStatus::*;

use crate::metrics::*;
use crate::test_support::*;

// course_completion_percent tests
#[test]
fn test_completion_none_without_projects() {
    assert_eq!(course_completion_percent(&course(NotStarted, vec![])), None);
    assert_eq!(course_completion_percent(&course(NotStarted, vec![vec![]])), None);
}

#[test]
fn test_completion_across_batches() {
    let tree = course(
        InProgress,
        vec![
            vec![project(Completed, None), project(InProgress, None)],
            vec![project(Completed, None), project(NotStarted, None)],
        ],
    );
    assert_eq!(course_completion_percent(&tree), Some(50.0));
}

// is_batch_complete tests
#[test]
fn test_empty_batch_not_complete() {
    let tree = course(NotStarted, vec![vec![]]);
    assert!(!is_batch_complete(&tree.batches[0]));
}

#[test]
fn test_batch_complete_when_all_completed() {
    let tree = course(Completed, vec![vec![project(Completed, None), project(Completed, None)]]);
    assert!(is_batch_complete(&tree.batches[0]));
}

// is_stale tests
#[test]
fn test_never_calculated_is_stale() {
    assert!(is_stale(None, at(10), Duration::hours(24)));
}

#[test]
fn test_recent_calculation_is_fresh() {
    let now = at(10);
    assert!(!is_stale(Some(now - Duration::hours(23)), now, Duration::hours(24)));
}

#[test]
fn test_exactly_window_is_stale() {
    let now = at(10);
    assert!(is_stale(Some(now - Duration::hours(24)), now, Duration::hours(24)));
}

#[test]
fn test_staleness_hours_calculation() {
    let now = at(10);
    assert_eq!(staleness_hours(now - Duration::hours(5), now), 5);
}

// rank_percentile tests
#[test]
fn test_percentile_bounds() {
    assert_eq!(rank_percentile(1, 5), 100.0);
    assert_eq!(rank_percentile(5, 5), 0.0);
    assert_eq!(rank_percentile(3, 5), 50.0);
}

#[test]
fn test_percentile_lone_member() {
    assert_eq!(rank_percentile(1, 1), 100.0);
}
