//! Score formulas and rank ordering
//!
//! Everything here is pure: callers load rows, these functions turn them into
//! numbers, callers persist the result. Recomputing from the same rows always
//! gives the same score.

use std::cmp::Ordering;
use std::collections::HashSet;

use common::models::{CourseTree, GithubActivity, GroupScore, ProgressStatus};
use db::group_scores::GroupScoreValues;
use uuid::Uuid;

use crate::metrics;

/// Group score weights
pub mod weights {
    pub const COURSE_STARTED: f64 = 5.0;
    pub const AVERAGE_COMPLETION: f64 = 2.0;
    pub const PROJECT_STARTED: f64 = 3.0;
    pub const PROJECT_COMPLETED: f64 = 8.0;
    pub const AI_EVALUATION: f64 = 0.1;
    /// Awarded once per batch whose projects are all completed
    pub const BATCH_COMPLETED: f64 = 5.0;
}

/// GitHub score weights
pub mod github_weights {
    pub const COMMIT: f64 = 1.0;
    pub const PULL_REQUEST: f64 = 5.0;
    pub const ISSUE: f64 = 2.0;
    pub const REVIEW: f64 = 3.0;
    pub const CURRENT_STREAK_DAY: f64 = 2.0;
    pub const LONGEST_STREAK_DAY: f64 = 1.0;
}

/// Share of the GitHub score in the global score
pub const GITHUB_SHARE: f64 = 0.4;
/// Share of the summed group scores in the global score
pub const GROUP_SHARE: f64 = 0.6;

/// Compute a user's score in one group from the courses filed under it
pub fn compute_group_score(courses: &[CourseTree]) -> GroupScoreValues {
    let mut values = GroupScoreValues::default();
    let mut completion_sum = 0.0;
    let mut courses_with_projects = 0;

    for course in courses.iter().filter(|c| c.course.deleted_at.is_none()) {
        if course.derived_status().is_started() {
            values.courses_started += 1;
        }

        if let Some(percent) = metrics::course_completion_percent(course) {
            completion_sum += percent;
            courses_with_projects += 1;
        }

        for batch in &course.batches {
            if metrics::is_batch_complete(batch) {
                values.batches_completed += 1;
            }
            for project in &batch.projects {
                if project.status.is_started() {
                    values.projects_started += 1;
                }
                if project.status == ProgressStatus::Completed {
                    values.projects_completed += 1;
                    values.total_ai_evaluation_score += project.ai_evaluation_score.unwrap_or(0.0);
                }
            }
        }
    }

    if courses_with_projects > 0 {
        values.average_course_completion = completion_sum / courses_with_projects as f64;
    }

    let raw = values.courses_started as f64 * weights::COURSE_STARTED
        + values.average_course_completion * weights::AVERAGE_COMPLETION
        + values.projects_started as f64 * weights::PROJECT_STARTED
        + values.projects_completed as f64 * weights::PROJECT_COMPLETED
        + values.total_ai_evaluation_score * weights::AI_EVALUATION
        + values.batches_completed as f64 * weights::BATCH_COMPLETED;
    values.final_score = raw.round() as i64;

    values
}

/// Linear score over the GitHub activity counters
pub fn github_score(activity: &GithubActivity) -> i64 {
    let raw = activity.commits as f64 * github_weights::COMMIT
        + activity.pull_requests as f64 * github_weights::PULL_REQUEST
        + activity.issues as f64 * github_weights::ISSUE
        + activity.reviews as f64 * github_weights::REVIEW
        + activity.current_streak as f64 * github_weights::CURRENT_STREAK_DAY
        + activity.longest_streak as f64 * github_weights::LONGEST_STREAK_DAY;
    raw.round() as i64
}

/// Blend the GitHub score with the summed group scores
pub fn blend_final_score(github_score: i64, group_score_total: i64) -> i64 {
    (github_score as f64 * GITHUB_SHARE + group_score_total as f64 * GROUP_SHARE).round() as i64
}

/// Leaderboard order: higher score first, then most recently updated, then id
pub fn rank_order(a: &GroupScore, b: &GroupScore) -> Ordering {
    b.final_score
        .cmp(&a.final_score)
        .then_with(|| b.last_updated_date.cmp(&a.last_updated_date))
        .then_with(|| a.id.cmp(&b.id))
}

/// Assign dense 1-based ranks to score rows.
///
/// Returns (group score id, rank) pairs in rank order. Ties on score are
/// broken by the full `rank_order` key, so ranks are always 1..=N.
pub fn assign_ranks(scores: &[GroupScore]) -> Vec<(Uuid, i32)> {
    let mut ordered: Vec<&GroupScore> = scores.iter().collect();
    ordered.sort_by(|a, b| rank_order(a, b));
    ordered
        .into_iter()
        .enumerate()
        .map(|(idx, score)| (score.id, (idx + 1) as i32))
        .collect()
}

/// Rank writes for one group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankPartition {
    /// (group score id, rank) for active members, in rank order
    pub ranks: Vec<(Uuid, i32)>,
    /// Rows of departed members that still carry a rank
    pub cleared: Vec<Uuid>,
}

/// Split a group's score rows into ranked active members and departed rows
/// whose rank must be cleared.
pub fn partition_ranks(rows: &[GroupScore], active_users: &HashSet<Uuid>) -> RankPartition {
    let (active, departed): (Vec<&GroupScore>, Vec<&GroupScore>) = rows
        .iter()
        .partition(|r| active_users.contains(&r.user_id));

    let active: Vec<GroupScore> = active.into_iter().cloned().collect();
    RankPartition {
        ranks: assign_ranks(&active),
        cleared: departed
            .into_iter()
            .filter(|r| r.rank.is_some())
            .map(|r| r.id)
            .collect(),
    }
}
