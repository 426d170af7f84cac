//! Global score queries

use chrono::{DateTime, Utc};
use common::models::{GithubActivity, Score};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

const SCORE_COLUMNS: &str = r#"
    id, user_id, commits, pull_requests, issues, reviews,
    current_streak, longest_streak, github_score, group_score_total,
    final_score, last_calculated_at, updated_at
"#;

fn map_score(r: &PgRow) -> Result<Score, sqlx::Error> {
    Ok(Score {
        id: r.try_get("id")?,
        user_id: r.try_get("user_id")?,
        commits: r.try_get("commits")?,
        pull_requests: r.try_get("pull_requests")?,
        issues: r.try_get("issues")?,
        reviews: r.try_get("reviews")?,
        current_streak: r.try_get("current_streak")?,
        longest_streak: r.try_get("longest_streak")?,
        github_score: r.try_get("github_score")?,
        group_score_total: r.try_get("group_score_total")?,
        final_score: r.try_get("final_score")?,
        last_calculated_at: r.try_get("last_calculated_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

/// Get a user's score row
pub async fn get_for_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Score>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM scores WHERE user_id = $1",
        SCORE_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(map_score).transpose()
}

/// Get a user's score row, creating a zeroed one if missing
pub async fn ensure(pool: &PgPool, user_id: Uuid) -> Result<Score, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO scores (id, user_id, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .execute(pool)
    .await?;

    let row = sqlx::query(&format!(
        "SELECT {} FROM scores WHERE user_id = $1",
        SCORE_COLUMNS
    ))
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    map_score(&row)
}

/// Overwrite the GitHub counters
pub async fn set_github_activity(
    pool: &PgPool,
    user_id: Uuid,
    activity: &GithubActivity,
) -> Result<Score, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO scores (
            id, user_id, commits, pull_requests, issues, reviews,
            current_streak, longest_streak, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
        ON CONFLICT (user_id) DO UPDATE
        SET commits = EXCLUDED.commits,
            pull_requests = EXCLUDED.pull_requests,
            issues = EXCLUDED.issues,
            reviews = EXCLUDED.reviews,
            current_streak = EXCLUDED.current_streak,
            longest_streak = EXCLUDED.longest_streak,
            updated_at = NOW()
        RETURNING {}
        "#,
        SCORE_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(activity.commits)
    .bind(activity.pull_requests)
    .bind(activity.issues)
    .bind(activity.reviews)
    .bind(activity.current_streak)
    .bind(activity.longest_streak)
    .fetch_one(pool)
    .await?;

    map_score(&row)
}

/// Store the derived global score fields
pub async fn set_derived(
    pool: &PgPool,
    user_id: Uuid,
    github_score: i64,
    group_score_total: i64,
    final_score: i64,
    calculated_at: DateTime<Utc>,
) -> Result<Score, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        UPDATE scores
        SET github_score = $2,
            group_score_total = $3,
            final_score = $4,
            last_calculated_at = $5,
            updated_at = NOW()
        WHERE user_id = $1
        RETURNING {}
        "#,
        SCORE_COLUMNS
    ))
    .bind(user_id)
    .bind(github_score)
    .bind(group_score_total)
    .bind(final_score)
    .bind(calculated_at)
    .fetch_one(pool)
    .await?;

    map_score(&row)
}
