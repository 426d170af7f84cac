//! Per-group score updates and rank recomputation

use std::collections::HashSet;

use chrono::Utc;
use common::models::GroupScore;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db_err;
use crate::scores;

/// Recomputes group scores and ranks
#[derive(Clone)]
pub struct GroupScoreCalculator {
    pool: PgPool,
}

impl GroupScoreCalculator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Recompute one user's score in a group from their courses, then re-rank the group.
    ///
    /// The group is not checked for existence; an unknown group has no courses
    /// and scores 0.
    pub async fn update_group_score(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<GroupScore, common::Error> {
        let courses = db::courses::list_trees_for_user_in_group(&self.pool, user_id, group_id)
            .await
            .map_err(db_err)?;

        let values = scores::compute_group_score(&courses);
        debug!(
            "Group {} user {}: {} courses, {:?}",
            group_id,
            user_id,
            courses.len(),
            values
        );

        let row = db::group_scores::upsert(&self.pool, user_id, group_id, &values, Utc::now())
            .await
            .map_err(db_err)?;

        info!(
            "Updated group score for user {} in group {}: {}",
            user_id, group_id, row.final_score
        );

        self.recompute_ranks(group_id).await?;

        // Re-read so the returned row carries the fresh rank
        let row = db::group_scores::get(&self.pool, user_id, group_id)
            .await
            .map_err(db_err)?
            .unwrap_or(row);

        Ok(row)
    }

    /// Re-rank the active members of a group and clear the rank of departed
    /// ones. Returns the number of ranked rows.
    pub async fn recompute_ranks(&self, group_id: Uuid) -> Result<usize, common::Error> {
        let rows = db::group_scores::list_for_group(&self.pool, group_id)
            .await
            .map_err(db_err)?;
        let active: HashSet<Uuid> = db::groups::active_user_ids(&self.pool, group_id)
            .await
            .map_err(db_err)?
            .into_iter()
            .collect();

        let partition = scores::partition_ranks(&rows, &active);

        db::group_scores::apply_ranks(&self.pool, group_id, &partition.ranks, &partition.cleared)
            .await
            .map_err(db_err)?;

        debug!(
            "Ranked {} members of group {}, cleared {}",
            partition.ranks.len(),
            group_id,
            partition.cleared.len()
        );
        Ok(partition.ranks.len())
    }
}
