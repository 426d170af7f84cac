//! Read-only user analytics

use common::models::{CourseTree, ProgressStatus, Score};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db_err;

/// Progress overview of a user across the platform
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UserAnalytics {
    pub courses_total: usize,
    pub courses_started: usize,
    pub courses_completed: usize,
    pub projects_total: usize,
    pub projects_in_progress: usize,
    pub projects_completed: usize,
    /// Mean AI score over completed projects that have one
    pub average_ai_score: Option<f64>,
    pub badges_earned: usize,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub active_groups: usize,
    pub final_score: i64,
}

/// Summarize loaded rows into analytics
pub fn summarize(
    courses: &[CourseTree],
    badges_earned: usize,
    score: Option<&Score>,
    active_groups: usize,
) -> UserAnalytics {
    let mut analytics = UserAnalytics {
        courses_total: courses.len(),
        badges_earned,
        active_groups,
        ..Default::default()
    };

    let mut ai_sum = 0.0;
    let mut ai_count = 0;

    for course in courses {
        let status = course.derived_status();
        if status.is_started() {
            analytics.courses_started += 1;
        }
        if status == ProgressStatus::Completed {
            analytics.courses_completed += 1;
        }

        for project in course.projects() {
            analytics.projects_total += 1;
            match project.status {
                ProgressStatus::InProgress => analytics.projects_in_progress += 1,
                ProgressStatus::Completed => {
                    analytics.projects_completed += 1;
                    if let Some(ai) = project.ai_evaluation_score {
                        ai_sum += ai;
                        ai_count += 1;
                    }
                }
                ProgressStatus::NotStarted => {}
            }
        }
    }

    if ai_count > 0 {
        analytics.average_ai_score = Some(ai_sum / ai_count as f64);
    }

    if let Some(score) = score {
        analytics.current_streak = score.current_streak;
        analytics.longest_streak = score.longest_streak;
        analytics.final_score = score.final_score;
    }

    analytics
}

/// Builds analytics views from stored progress
#[derive(Clone)]
pub struct AnalyticsService {
    pool: PgPool,
}

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn user_overview(&self, user_id: Uuid) -> Result<UserAnalytics, common::Error> {
        let courses = db::courses::list_trees_for_user(&self.pool, user_id)
            .await
            .map_err(db_err)?;
        let badges = db::badges::list_for_user(&self.pool, user_id)
            .await
            .map_err(db_err)?;
        let score = db::scores::get_for_user(&self.pool, user_id)
            .await
            .map_err(db_err)?;
        let groups = db::groups::active_group_ids_for_user(&self.pool, user_id)
            .await
            .map_err(db_err)?;

        Ok(summarize(&courses, badges.len(), score.as_ref(), groups.len()))
    }
}
