//! Group comparisons and score history

use common::models::{GroupScore, PerformanceSnapshot};
use serde::Serialize;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::{db_err, metrics};

/// A user's standing within one group
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupComparison {
    pub group_id: Uuid,
    pub user_score: i64,
    pub rank: Option<i32>,
    pub member_count: usize,
    pub group_average: f64,
    pub group_top: i64,
    pub percentile: Option<f64>,
}

/// Compare a user's row against all active rows of the same group.
///
/// `None` when the user has no row among `group_rows`.
pub fn compare_in_group(user_id: Uuid, group_rows: &[GroupScore]) -> Option<GroupComparison> {
    let own = group_rows.iter().find(|r| r.user_id == user_id)?;

    let member_count = group_rows.len();
    let total: i64 = group_rows.iter().map(|r| r.final_score).sum();
    let group_top = group_rows.iter().map(|r| r.final_score).max().unwrap_or(0);

    Some(GroupComparison {
        group_id: own.group_id,
        user_score: own.final_score,
        rank: own.rank,
        member_count,
        group_average: total as f64 / member_count as f64,
        group_top,
        percentile: own.rank.map(|rank| metrics::rank_percentile(rank, member_count)),
    })
}

/// Compares users against their groups and keeps score history
#[derive(Clone)]
pub struct PerformanceService {
    pool: PgPool,
}

impl PerformanceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Standing in one group, `None` if the user has no score there
    pub async fn compare(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<Option<GroupComparison>, common::Error> {
        let rows = db::group_scores::list_active_for_group(&self.pool, group_id)
            .await
            .map_err(db_err)?;
        Ok(compare_in_group(user_id, &rows))
    }

    /// Standing in every group the user is active in
    pub async fn compare_all(&self, user_id: Uuid) -> Result<Vec<GroupComparison>, common::Error> {
        let group_ids = db::groups::active_group_ids_for_user(&self.pool, user_id)
            .await
            .map_err(db_err)?;

        let mut comparisons = Vec::with_capacity(group_ids.len());
        for group_id in group_ids {
            if let Some(comparison) = self.compare(user_id, group_id).await? {
                comparisons.push(comparison);
            }
        }
        Ok(comparisons)
    }

    /// Snapshot the global score and every active group score of a user
    pub async fn record_snapshots(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PerformanceSnapshot>, common::Error> {
        let mut snapshots = Vec::new();

        let group_scores = db::group_scores::list_active_for_user(&self.pool, user_id)
            .await
            .map_err(db_err)?;
        for score in group_scores {
            let snapshot = db::snapshots::insert(
                &self.pool,
                user_id,
                Some(score.group_id),
                score.final_score,
                score.rank,
            )
            .await
            .map_err(db_err)?;
            snapshots.push(snapshot);
        }

        if let Some(score) = db::scores::get_for_user(&self.pool, user_id)
            .await
            .map_err(db_err)?
        {
            let rank = db::leaderboard::get_user_rank(&self.pool, user_id)
                .await
                .map_err(db_err)?;
            let snapshot = db::snapshots::insert(&self.pool, user_id, None, score.final_score, rank)
                .await
                .map_err(db_err)?;
            snapshots.push(snapshot);
        }

        debug!("Recorded {} snapshots for user {}", snapshots.len(), user_id);
        Ok(snapshots)
    }

    /// Snapshot history, newest first. `group_id = None` selects the global history.
    pub async fn history(
        &self,
        user_id: Uuid,
        group_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<PerformanceSnapshot>, common::Error> {
        db::snapshots::list_for_user(&self.pool, user_id, group_id, limit)
            .await
            .map_err(db_err)
    }
}
