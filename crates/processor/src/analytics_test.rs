use common::models::ProgressStatus::*;

use crate::analytics::summarize;
use crate::test_support::*;

#[test]
fn test_summarize_empty_user() {
    let analytics = summarize(&[], 0, None, 0);

    assert_eq!(analytics.courses_total, 0);
    assert_eq!(analytics.average_ai_score, None);
    assert_eq!(analytics.final_score, 0);
}

#[test]
fn test_summarize_counts_courses_and_projects() {
    let courses = vec![
        course(
            Completed,
            vec![vec![project(Completed, Some(80.0)), project(Completed, Some(90.0))]],
        ),
        course(
            InProgress,
            vec![vec![project(InProgress, None), project(NotStarted, None)]],
        ),
        course(NotStarted, vec![]),
    ];
    let score = score(4, 9, 321);

    let analytics = summarize(&courses, 2, Some(&score), 3);

    assert_eq!(analytics.courses_total, 3);
    assert_eq!(analytics.courses_started, 2);
    assert_eq!(analytics.courses_completed, 1);
    assert_eq!(analytics.projects_total, 4);
    assert_eq!(analytics.projects_in_progress, 1);
    assert_eq!(analytics.projects_completed, 2);
    assert_eq!(analytics.average_ai_score, Some(85.0));
    assert_eq!(analytics.badges_earned, 2);
    assert_eq!(analytics.current_streak, 4);
    assert_eq!(analytics.longest_streak, 9);
    assert_eq!(analytics.active_groups, 3);
    assert_eq!(analytics.final_score, 321);
}

#[test]
fn test_average_ai_score_ignores_unevaluated_projects() {
    let courses = vec![course(
        Completed,
        vec![vec![project(Completed, Some(60.0)), project(Completed, None)]],
    )];

    assert_eq!(summarize(&courses, 0, None, 0).average_ai_score, Some(60.0));
}

#[test]
fn test_course_counts_follow_project_progress_not_stored_status() {
    // Stored status lags behind: all projects are done
    let courses = vec![course(
        NotStarted,
        vec![vec![project(Completed, None), project(Completed, None)]],
    )];

    let analytics = summarize(&courses, 0, None, 0);

    assert_eq!(analytics.courses_started, 1);
    assert_eq!(analytics.courses_completed, 1);
}
