//! Full score recalculation

use std::collections::BTreeSet;

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db_err;
use crate::global_score::GlobalScoreCalculator;
use crate::group_score::GroupScoreCalculator;

/// Recompute every active group score, every group's ranks and every global score
pub async fn recalculate_all(
    pool: &PgPool,
    global_calculator: &GlobalScoreCalculator,
) -> Result<RecalculationStats, common::Error> {
    info!("Starting full score recalculation");

    let group_calculator = GroupScoreCalculator::new(pool.clone());

    let pairs = db::groups::list_active_pairs(pool).await.map_err(db_err)?;
    info!("Recomputing {} active group memberships", pairs.len());

    let mut stats = RecalculationStats::default();
    for (user_id, group_id) in &pairs {
        match group_calculator.update_group_score(*user_id, *group_id).await {
            Ok(_) => stats.group_scores_updated += 1,
            Err(e) => {
                warn!(
                    "Failed to recompute group {} for user {}: {}",
                    group_id, user_id, e
                );
                stats.failures += 1;
            }
        }
    }

    // Groups whose members all left still need their stale ranks cleared
    let group_ids: BTreeSet<Uuid> = db::groups::list_group_ids(pool)
        .await
        .map_err(db_err)?
        .into_iter()
        .collect();
    for group_id in &group_ids {
        match group_calculator.recompute_ranks(*group_id).await {
            Ok(_) => stats.groups_ranked += 1,
            Err(e) => {
                warn!("Failed to rank group {}: {}", group_id, e);
                stats.failures += 1;
            }
        }
    }

    let user_ids = db::users::list_ids(pool).await.map_err(db_err)?;
    for user_id in user_ids {
        match global_calculator.update_global_score(user_id, true).await {
            Ok(_) => stats.users_updated += 1,
            Err(e) => {
                warn!("Failed to recompute global score for user {}: {}", user_id, e);
                stats.failures += 1;
            }
        }
    }

    info!(
        "Recalculation complete: {} group scores, {} groups ranked, {} users, {} failures",
        stats.group_scores_updated, stats.groups_ranked, stats.users_updated, stats.failures
    );

    Ok(stats)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecalculationStats {
    pub group_scores_updated: usize,
    pub groups_ranked: usize,
    pub users_updated: usize,
    pub failures: usize,
}
