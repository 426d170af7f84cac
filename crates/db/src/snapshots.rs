//! Performance snapshot queries

use common::models::PerformanceSnapshot;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Record a snapshot. `group_id = None` marks the global score.
pub async fn insert(
    pool: &PgPool,
    user_id: Uuid,
    group_id: Option<Uuid>,
    final_score: i64,
    rank: Option<i32>,
) -> Result<PerformanceSnapshot, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO performance_snapshots (id, user_id, group_id, final_score, rank, taken_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        RETURNING id, user_id, group_id, final_score, rank, taken_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(group_id)
    .bind(final_score)
    .bind(rank)
    .fetch_one(pool)
    .await?;

    Ok(PerformanceSnapshot {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        group_id: row.try_get("group_id")?,
        final_score: row.try_get("final_score")?,
        rank: row.try_get("rank")?,
        taken_at: row.try_get("taken_at")?,
    })
}

/// Snapshots of a user, newest first.
///
/// With `group_id` set only that group's snapshots are returned, otherwise only
/// global ones.
pub async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
    group_id: Option<Uuid>,
    limit: i64,
) -> Result<Vec<PerformanceSnapshot>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, group_id, final_score, rank, taken_at
        FROM performance_snapshots
        WHERE user_id = $1 AND group_id IS NOT DISTINCT FROM $2
        ORDER BY taken_at DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(group_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|r| -> Result<_, sqlx::Error> {
            Ok(PerformanceSnapshot {
                id: r.try_get("id")?,
                user_id: r.try_get("user_id")?,
                group_id: r.try_get("group_id")?,
                final_score: r.try_get("final_score")?,
                rank: r.try_get("rank")?,
                taken_at: r.try_get("taken_at")?,
            })
        })
        .collect()
}
