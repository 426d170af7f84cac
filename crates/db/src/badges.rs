//! Badge queries

use common::models::{Badge, UserBadge};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Award a badge. Returns true if the user did not have it yet.
pub async fn award(pool: &PgPool, user_id: Uuid, badge_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO user_badges (user_id, badge_id, awarded_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (user_id, badge_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(badge_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Check if user has a badge
pub async fn has_badge(pool: &PgPool, user_id: Uuid, badge_id: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM user_badges
            WHERE user_id = $1 AND badge_id = $2
        ) as exists
        "#,
    )
    .bind(user_id)
    .bind(badge_id)
    .fetch_one(pool)
    .await?;

    row.try_get("exists")
}

/// All badge definitions
pub async fn list_definitions(pool: &PgPool) -> Result<Vec<Badge>, sqlx::Error> {
    let rows = sqlx::query("SELECT id, name, description, emoji FROM badges ORDER BY id")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|r| -> Result<_, sqlx::Error> {
            Ok(Badge {
                id: r.try_get("id")?,
                name: r.try_get("name")?,
                description: r.try_get("description")?,
                emoji: r.try_get("emoji")?,
            })
        })
        .collect()
}

/// Badges of a user with their display details, newest first
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<UserBadge>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT ub.user_id, ub.badge_id, ub.awarded_at, b.name, b.emoji
        FROM user_badges ub
        JOIN badges b ON b.id = ub.badge_id
        WHERE ub.user_id = $1
        ORDER BY ub.awarded_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|r| -> Result<_, sqlx::Error> {
            Ok(UserBadge {
                user_id: r.try_get("user_id")?,
                badge_id: r.try_get("badge_id")?,
                awarded_at: r.try_get("awarded_at")?,
                name: Some(r.try_get("name")?),
                emoji: Some(r.try_get("emoji")?),
            })
        })
        .collect()
}
