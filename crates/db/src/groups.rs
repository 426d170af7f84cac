//! Group and membership queries

use common::models::{Group, GroupMembership, GroupType};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::decode_err;

fn map_group(r: &PgRow) -> Result<Group, sqlx::Error> {
    let group_type: String = r.try_get("group_type")?;
    Ok(Group {
        id: r.try_get("id")?,
        name: r.try_get("name")?,
        description: r.try_get("description")?,
        group_type: group_type.parse::<GroupType>().map_err(decode_err)?,
        created_at: r.try_get("created_at")?,
    })
}

fn map_membership(r: &PgRow) -> Result<GroupMembership, sqlx::Error> {
    Ok(GroupMembership {
        group_id: r.try_get("group_id")?,
        user_id: r.try_get("user_id")?,
        joined_at: r.try_get("joined_at")?,
        left_at: r.try_get("left_at")?,
    })
}

/// Create a new group
pub async fn create_group(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    group_type: GroupType,
) -> Result<Group, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO groups (id, name, description, group_type)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, description, group_type, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .bind(group_type.as_str())
    .fetch_one(pool)
    .await?;

    map_group(&row)
}

/// Get a group by ID
pub async fn get_group(pool: &PgPool, group_id: Uuid) -> Result<Option<Group>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, name, description, group_type, created_at
        FROM groups
        WHERE id = $1
        "#,
    )
    .bind(group_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(map_group).transpose()
}

/// List all groups, optionally filtered by type
pub async fn list_groups(
    pool: &PgPool,
    group_type: Option<GroupType>,
) -> Result<Vec<Group>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, description, group_type, created_at
        FROM groups
        WHERE ($1::text IS NULL OR group_type = $1)
        ORDER BY name
        "#,
    )
    .bind(group_type.map(|t| t.as_str()))
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_group).collect()
}

/// IDs of every group
pub async fn list_group_ids(pool: &PgPool) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows = sqlx::query("SELECT id FROM groups ORDER BY created_at")
        .fetch_all(pool)
        .await?;

    rows.iter().map(|r| r.try_get("id")).collect()
}

/// Add a user to a group, reactivating a previous membership
pub async fn join(
    pool: &PgPool,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<GroupMembership, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO group_memberships (group_id, user_id, joined_at, left_at)
        VALUES ($1, $2, NOW(), NULL)
        ON CONFLICT (group_id, user_id) DO UPDATE
        SET joined_at = CASE
                WHEN group_memberships.left_at IS NULL THEN group_memberships.joined_at
                ELSE NOW()
            END,
            left_at = NULL
        RETURNING group_id, user_id, joined_at, left_at
        "#,
    )
    .bind(group_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    map_membership(&row)
}

/// Mark a membership as left. Returns false if the user was not an active member.
pub async fn leave(pool: &PgPool, group_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE group_memberships
        SET left_at = NOW()
        WHERE group_id = $1 AND user_id = $2 AND left_at IS NULL
        "#,
    )
    .bind(group_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Active members of a group as (user id, username, joined at)
pub async fn list_active_members(
    pool: &PgPool,
    group_id: Uuid,
) -> Result<Vec<(Uuid, String, chrono::DateTime<chrono::Utc>)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.username, gm.joined_at
        FROM group_memberships gm
        JOIN users u ON u.id = gm.user_id
        WHERE gm.group_id = $1 AND gm.left_at IS NULL
        ORDER BY gm.joined_at
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|r| -> Result<_, sqlx::Error> {
            Ok((r.try_get("id")?, r.try_get("username")?, r.try_get("joined_at")?))
        })
        .collect()
}

/// Groups the user is currently an active member of
pub async fn active_group_ids_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT group_id
        FROM group_memberships
        WHERE user_id = $1 AND left_at IS NULL
        ORDER BY joined_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(|r| r.try_get("group_id")).collect()
}

/// Every active (user, group) membership pair
pub async fn list_active_pairs(pool: &PgPool) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT user_id, group_id
        FROM group_memberships
        WHERE left_at IS NULL
        ORDER BY group_id, joined_at
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|r| -> Result<_, sqlx::Error> {
            Ok((r.try_get("user_id")?, r.try_get("group_id")?))
        })
        .collect()
}

/// IDs of the users currently active in a group
pub async fn active_user_ids(pool: &PgPool, group_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT user_id FROM group_memberships WHERE group_id = $1 AND left_at IS NULL",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(|r| r.try_get("user_id")).collect()
}

/// Delete a group along with its score rows.
///
/// Returns the users who were active members at deletion time, or `None` if
/// the group did not exist.
pub async fn delete_group(
    pool: &PgPool,
    group_id: Uuid,
) -> Result<Option<Vec<Uuid>>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let member_ids = sqlx::query(
        r#"
        SELECT user_id
        FROM group_memberships
        WHERE group_id = $1 AND left_at IS NULL
        FOR UPDATE
        "#,
    )
    .bind(group_id)
    .fetch_all(&mut *tx)
    .await?
    .iter()
    .map(|r| r.try_get("user_id"))
    .collect::<Result<Vec<Uuid>, _>>()?;

    // group_scores.group_id carries no foreign key
    sqlx::query("DELETE FROM group_scores WHERE group_id = $1")
        .bind(group_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM groups WHERE id = $1")
        .bind(group_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    tx.commit().await?;
    Ok(Some(member_ids))
}
