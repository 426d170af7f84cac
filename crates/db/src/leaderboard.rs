//! Global leaderboard queries

use common::models::LeaderboardEntry;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Platform-wide leaderboard by final score
pub async fn get_leaderboard(
    pool: &PgPool,
    limit: i32,
) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.username, s.github_score, s.group_score_total, s.final_score
        FROM scores s
        JOIN users u ON u.id = s.user_id
        ORDER BY s.final_score DESC, s.last_calculated_at DESC NULLS LAST, u.id ASC
        LIMIT $1
        "#,
    )
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .enumerate()
        .map(|(idx, r)| -> Result<_, sqlx::Error> {
            Ok(LeaderboardEntry {
                rank: (idx + 1) as i32,
                user_id: r.try_get("id")?,
                username: r.try_get("username")?,
                github_score: r.try_get("github_score")?,
                group_score_total: r.try_get("group_score_total")?,
                final_score: r.try_get("final_score")?,
            })
        })
        .collect()
}

/// Get a user's position on the global leaderboard
pub async fn get_user_rank(pool: &PgPool, user_id: Uuid) -> Result<Option<i32>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        WITH ranked AS (
            SELECT
                s.user_id,
                ROW_NUMBER() OVER (
                    ORDER BY s.final_score DESC, s.last_calculated_at DESC NULLS LAST, s.user_id ASC
                ) as rank
            FROM scores s
        )
        SELECT rank::int as rank FROM ranked WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| r.try_get("rank")).transpose()
}
