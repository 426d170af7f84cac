//! Badge checking and awarding

use common::models::{CourseTree, GroupScore, ProgressStatus};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db_err;

/// Badge definitions
pub mod defs {
    pub const FIRST_PROJECT: &str = "first_project";
    pub const PROJECT_FINISHER: &str = "project_finisher";
    pub const COURSE_COMPLETE: &str = "course_complete";
    pub const GROUP_CHAMPION: &str = "group_champion";
    pub const STREAK_7: &str = "streak_7";
}

/// Facts the badge rules look at
#[derive(Debug, Clone, Default)]
pub struct BadgeFacts {
    pub projects_completed: usize,
    pub courses_completed: usize,
    /// Leads a group with at least two ranked members
    pub leads_contested_group: bool,
    pub current_streak: i32,
}

impl BadgeFacts {
    pub fn from_courses(courses: &[CourseTree]) -> Self {
        Self {
            projects_completed: courses
                .iter()
                .flat_map(|c| c.projects())
                .filter(|p| p.status == ProgressStatus::Completed)
                .count(),
            courses_completed: courses
                .iter()
                .filter(|c| c.derived_status() == ProgressStatus::Completed)
                .count(),
            ..Default::default()
        }
    }
}

/// Badges whose rule the facts satisfy
pub fn earned_badges(facts: &BadgeFacts) -> Vec<&'static str> {
    let mut earned = Vec::new();

    if facts.projects_completed >= 1 {
        earned.push(defs::FIRST_PROJECT);
    }
    if facts.projects_completed >= 10 {
        earned.push(defs::PROJECT_FINISHER);
    }
    if facts.courses_completed >= 1 {
        earned.push(defs::COURSE_COMPLETE);
    }
    if facts.leads_contested_group {
        earned.push(defs::GROUP_CHAMPION);
    }
    if facts.current_streak >= 7 {
        earned.push(defs::STREAK_7);
    }

    earned
}

/// Checks and awards badges
#[derive(Clone)]
pub struct BadgeChecker {
    pool: PgPool,
}

impl BadgeChecker {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Award every badge the user qualifies for. Returns the newly awarded ids.
    pub async fn check_user(&self, user_id: Uuid) -> Result<Vec<String>, common::Error> {
        let facts = self.load_facts(user_id).await?;

        let mut awarded = Vec::new();
        for badge_id in earned_badges(&facts) {
            if self.try_award(user_id, badge_id).await? {
                awarded.push(badge_id.to_string());
            }
        }

        Ok(awarded)
    }

    async fn load_facts(&self, user_id: Uuid) -> Result<BadgeFacts, common::Error> {
        let courses = db::courses::list_trees_for_user(&self.pool, user_id)
            .await
            .map_err(db_err)?;
        let mut facts = BadgeFacts::from_courses(&courses);

        let group_scores = db::group_scores::list_active_for_user(&self.pool, user_id)
            .await
            .map_err(db_err)?;
        facts.leads_contested_group = self.leads_contested_group(&group_scores).await?;

        facts.current_streak = db::scores::get_for_user(&self.pool, user_id)
            .await
            .map_err(db_err)?
            .map(|s| s.current_streak)
            .unwrap_or(0);

        Ok(facts)
    }

    async fn leads_contested_group(
        &self,
        group_scores: &[GroupScore],
    ) -> Result<bool, common::Error> {
        for score in group_scores.iter().filter(|s| s.rank == Some(1)) {
            let ranked = db::group_scores::list_active_for_group(&self.pool, score.group_id)
                .await
                .map_err(db_err)?;
            if ranked.len() >= 2 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Award a badge, returns true if newly awarded
    async fn try_award(&self, user_id: Uuid, badge_id: &str) -> Result<bool, common::Error> {
        let has = db::badges::has_badge(&self.pool, user_id, badge_id)
            .await
            .map_err(db_err)?;

        if has {
            return Ok(false);
        }

        let awarded = db::badges::award(&self.pool, user_id, badge_id)
            .await
            .map_err(db_err)?;

        if awarded {
            info!("🏅 Badge awarded: {} for user {}", badge_id, user_id);
        }
        Ok(awarded)
    }
}
