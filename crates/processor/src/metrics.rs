//! Progress metrics

use chrono::{DateTime, Duration, Utc};
use common::models::{BatchTree, CourseTree, ProgressStatus};

/// Share of a course's projects that are completed, in percent.
///
/// `None` for a course without projects so it stays out of averages.
pub fn course_completion_percent(course: &CourseTree) -> Option<f64> {
    let total = course.projects().count();
    if total == 0 {
        return None;
    }
    let completed = course
        .projects()
        .filter(|p| p.status == ProgressStatus::Completed)
        .count();
    Some(completed as f64 / total as f64 * 100.0)
}

/// A batch counts as complete when it has projects and all are completed
pub fn is_batch_complete(batch: &BatchTree) -> bool {
    !batch.projects.is_empty()
        && batch
            .projects
            .iter()
            .all(|p| p.status == ProgressStatus::Completed)
}

/// Calculate staleness in hours
pub fn staleness_hours(last_calculated: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - last_calculated).num_hours()
}

/// A score never calculated, or calculated at least `window` ago, is stale
pub fn is_stale(
    last_calculated: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    match last_calculated {
        Some(at) => now - at >= window,
        None => true,
    }
}

/// Position of a 1-based rank among `members`, as a percentile.
///
/// Rank 1 is the 100th percentile and the last rank the 0th. A lone member
/// sits at 100.
pub fn rank_percentile(rank: i32, members: usize) -> f64 {
    if members <= 1 {
        return 100.0;
    }
    let below = members as f64 - rank as f64;
    (below / (members as f64 - 1.0) * 100.0).clamp(0.0, 100.0)
}
