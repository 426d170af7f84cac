//! Platform-wide score updates

use chrono::{Duration, Utc};
use common::models::{GithubActivity, Score};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{db_err, metrics, scores};

/// Outcome of a global score update
#[derive(Debug, Clone)]
pub enum GlobalScoreUpdate {
    /// The score was recomputed and stored
    Recalculated(Score),
    /// The stored score was recent enough and left untouched
    Fresh(Score),
}

impl GlobalScoreUpdate {
    pub fn score(&self) -> &Score {
        match self {
            GlobalScoreUpdate::Recalculated(score) | GlobalScoreUpdate::Fresh(score) => score,
        }
    }

    pub fn into_score(self) -> Score {
        match self {
            GlobalScoreUpdate::Recalculated(score) | GlobalScoreUpdate::Fresh(score) => score,
        }
    }

    pub fn was_recalculated(&self) -> bool {
        matches!(self, GlobalScoreUpdate::Recalculated(_))
    }
}

/// Blends GitHub activity with group scores into the global score
#[derive(Clone)]
pub struct GlobalScoreCalculator {
    pool: PgPool,
    staleness: Duration,
}

impl GlobalScoreCalculator {
    pub fn new(pool: PgPool, staleness: Duration) -> Self {
        Self { pool, staleness }
    }

    /// Recompute a user's global score.
    ///
    /// Without `force`, a score calculated within the staleness window is
    /// returned as is.
    pub async fn update_global_score(
        &self,
        user_id: Uuid,
        force: bool,
    ) -> Result<GlobalScoreUpdate, common::Error> {
        db::users::get_by_id(&self.pool, user_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| common::Error::NotFound(format!("User {} not found", user_id)))?;

        let current = db::scores::ensure(&self.pool, user_id)
            .await
            .map_err(db_err)?;

        let now = Utc::now();
        if !force && !metrics::is_stale(current.last_calculated_at, now, self.staleness) {
            debug!(
                "Global score for user {} is fresh, skipping recalculation",
                user_id
            );
            return Ok(GlobalScoreUpdate::Fresh(current));
        }

        let github_score = scores::github_score(&GithubActivity::from(&current));

        let group_scores = db::group_scores::list_active_for_user(&self.pool, user_id)
            .await
            .map_err(db_err)?;
        let group_score_total: i64 = group_scores.iter().map(|g| g.final_score).sum();

        let final_score = scores::blend_final_score(github_score, group_score_total);

        let updated = db::scores::set_derived(
            &self.pool,
            user_id,
            github_score,
            group_score_total,
            final_score,
            now,
        )
        .await
        .map_err(db_err)?;

        info!(
            "Updated global score for user {}: github {} + groups {} ({} groups) -> {}",
            user_id,
            github_score,
            group_score_total,
            group_scores.len(),
            final_score
        );

        Ok(GlobalScoreUpdate::Recalculated(updated))
    }
}
