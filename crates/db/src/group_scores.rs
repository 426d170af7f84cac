//! Per-group score queries

use chrono::{DateTime, Utc};
use common::models::{GroupLeaderboardEntry, GroupScore};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

const GROUP_SCORE_COLUMNS: &str = r#"
    gs.id, gs.user_id, gs.group_id, gs.courses_started,
    gs.average_course_completion, gs.projects_started, gs.projects_completed,
    gs.total_ai_evaluation_score, gs.batches_completed, gs.final_score,
    gs.rank, gs.last_updated_date
"#;

/// Counters written by a group score update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupScoreValues {
    pub courses_started: i32,
    pub average_course_completion: f64,
    pub projects_started: i32,
    pub projects_completed: i32,
    pub total_ai_evaluation_score: f64,
    pub batches_completed: i32,
    pub final_score: i64,
}

fn map_group_score(r: &PgRow) -> Result<GroupScore, sqlx::Error> {
    Ok(GroupScore {
        id: r.try_get("id")?,
        user_id: r.try_get("user_id")?,
        group_id: r.try_get("group_id")?,
        courses_started: r.try_get("courses_started")?,
        average_course_completion: r.try_get("average_course_completion")?,
        projects_started: r.try_get("projects_started")?,
        projects_completed: r.try_get("projects_completed")?,
        total_ai_evaluation_score: r.try_get("total_ai_evaluation_score")?,
        batches_completed: r.try_get("batches_completed")?,
        final_score: r.try_get("final_score")?,
        rank: r.try_get("rank")?,
        last_updated_date: r.try_get("last_updated_date")?,
    })
}

/// Insert or overwrite the (user, group) score row. The rank is left untouched.
pub async fn upsert(
    pool: &PgPool,
    user_id: Uuid,
    group_id: Uuid,
    values: &GroupScoreValues,
    updated_at: DateTime<Utc>,
) -> Result<GroupScore, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO group_scores AS gs (
            id, user_id, group_id, courses_started, average_course_completion,
            projects_started, projects_completed, total_ai_evaluation_score,
            batches_completed, final_score, last_updated_date
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (user_id, group_id) DO UPDATE
        SET courses_started = EXCLUDED.courses_started,
            average_course_completion = EXCLUDED.average_course_completion,
            projects_started = EXCLUDED.projects_started,
            projects_completed = EXCLUDED.projects_completed,
            total_ai_evaluation_score = EXCLUDED.total_ai_evaluation_score,
            batches_completed = EXCLUDED.batches_completed,
            final_score = EXCLUDED.final_score,
            last_updated_date = EXCLUDED.last_updated_date
        RETURNING {}
        "#,
        GROUP_SCORE_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(group_id)
    .bind(values.courses_started)
    .bind(values.average_course_completion)
    .bind(values.projects_started)
    .bind(values.projects_completed)
    .bind(values.total_ai_evaluation_score)
    .bind(values.batches_completed)
    .bind(values.final_score)
    .bind(updated_at)
    .fetch_one(pool)
    .await?;

    map_group_score(&row)
}

/// Get the (user, group) score row
pub async fn get(
    pool: &PgPool,
    user_id: Uuid,
    group_id: Uuid,
) -> Result<Option<GroupScore>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM group_scores gs WHERE gs.user_id = $1 AND gs.group_id = $2",
        GROUP_SCORE_COLUMNS
    ))
    .bind(user_id)
    .bind(group_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(map_group_score).transpose()
}

/// Every score row of a group, including departed members
pub async fn list_for_group(pool: &PgPool, group_id: Uuid) -> Result<Vec<GroupScore>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM group_scores gs WHERE gs.group_id = $1",
        GROUP_SCORE_COLUMNS
    ))
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_group_score).collect()
}

/// Score rows of the group's currently active members, unordered
pub async fn list_active_for_group(
    pool: &PgPool,
    group_id: Uuid,
) -> Result<Vec<GroupScore>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM group_scores gs
        JOIN group_memberships gm
          ON gm.group_id = gs.group_id AND gm.user_id = gs.user_id
        WHERE gs.group_id = $1 AND gm.left_at IS NULL
        "#,
        GROUP_SCORE_COLUMNS
    ))
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_group_score).collect()
}

/// Score rows for every group the user is an active member of
pub async fn list_active_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<GroupScore>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM group_scores gs
        JOIN group_memberships gm
          ON gm.group_id = gs.group_id AND gm.user_id = gs.user_id
        WHERE gs.user_id = $1 AND gm.left_at IS NULL
        ORDER BY gs.final_score DESC
        "#,
        GROUP_SCORE_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_group_score).collect()
}

/// Write ranks for one group in a single transaction.
///
/// `ranks` holds (group score id, rank) pairs; `cleared` holds the ids of rows
/// whose rank is reset to NULL.
pub async fn apply_ranks(
    pool: &PgPool,
    group_id: Uuid,
    ranks: &[(Uuid, i32)],
    cleared: &[Uuid],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    if !cleared.is_empty() {
        sqlx::query("UPDATE group_scores SET rank = NULL WHERE group_id = $1 AND id = ANY($2)")
            .bind(group_id)
            .bind(cleared)
            .execute(&mut *tx)
            .await?;
    }

    for (id, rank) in ranks {
        sqlx::query("UPDATE group_scores SET rank = $2 WHERE id = $1")
            .bind(id)
            .bind(rank)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Group leaderboard ordered by stored rank
pub async fn leaderboard(
    pool: &PgPool,
    group_id: Uuid,
    limit: i32,
) -> Result<Vec<GroupLeaderboardEntry>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}, u.username
        FROM group_scores gs
        JOIN group_memberships gm
          ON gm.group_id = gs.group_id AND gm.user_id = gs.user_id
        JOIN users u ON u.id = gs.user_id
        WHERE gs.group_id = $1 AND gm.left_at IS NULL
        ORDER BY gs.rank ASC NULLS LAST, gs.final_score DESC
        LIMIT $2
        "#,
        GROUP_SCORE_COLUMNS
    ))
    .bind(group_id)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|r| -> Result<_, sqlx::Error> {
            let score = map_group_score(r)?;
            Ok(GroupLeaderboardEntry {
                rank: score.rank,
                username: r.try_get("username")?,
                score,
            })
        })
        .collect()
}
