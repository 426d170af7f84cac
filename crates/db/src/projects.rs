//! Project queries

use common::models::{ProgressStatus, Project};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::decode_err;

fn map_project(r: &PgRow) -> Result<Project, sqlx::Error> {
    let status: String = r.try_get("status")?;
    Ok(Project {
        id: r.try_get("id")?,
        batch_id: r.try_get("batch_id")?,
        title: r.try_get("title")?,
        position: r.try_get("position")?,
        status: status.parse().map_err(decode_err)?,
        ai_evaluation_score: r.try_get("ai_evaluation_score")?,
        updated_at: r.try_get("updated_at")?,
    })
}

/// Get a project by ID
pub async fn get(pool: &PgPool, project_id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, batch_id, title, position, status, ai_evaluation_score, updated_at
        FROM projects
        WHERE id = $1
        "#,
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(map_project).transpose()
}

/// Update status and, when given, the AI evaluation score
pub async fn update_progress(
    pool: &PgPool,
    project_id: Uuid,
    status: ProgressStatus,
    ai_evaluation_score: Option<f64>,
) -> Result<Option<Project>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE projects
        SET status = $2,
            ai_evaluation_score = COALESCE($3, ai_evaluation_score),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, batch_id, title, position, status, ai_evaluation_score, updated_at
        "#,
    )
    .bind(project_id)
    .bind(status.as_str())
    .bind(ai_evaluation_score)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(map_project).transpose()
}
