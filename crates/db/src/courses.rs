//! Course, batch and project tree queries

use chrono::{DateTime, Utc};
use common::models::{Batch, BatchTree, Course, CourseTree, ProgressStatus, Project};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::decode_err;

/// Flattened course/batch/project join, one row per project
const TREE_SELECT: &str = r#"
    SELECT
        c.id AS c_id, c.user_id AS c_user_id, c.title AS c_title,
        c.group_id AS c_group_id, c.sector_id AS c_sector_id,
        c.status AS c_status, c.created_at AS c_created_at,
        c.deleted_at AS c_deleted_at,
        b.id AS b_id, b.title AS b_title, b.position AS b_position,
        p.id AS p_id, p.title AS p_title, p.position AS p_position,
        p.status AS p_status, p.ai_evaluation_score AS p_ai_evaluation_score,
        p.updated_at AS p_updated_at
    FROM courses c
    LEFT JOIN batches b ON b.course_id = c.id
    LEFT JOIN projects p ON p.batch_id = b.id
"#;

const TREE_ORDER: &str = "ORDER BY c.created_at, c.id, b.position, b.id, p.position, p.id";

/// New batch with its project titles
#[derive(Debug, Clone)]
pub struct NewBatch {
    pub title: String,
    pub projects: Vec<String>,
}

/// One row of the flattened tree join
pub type TreeRow = (Course, Option<Batch>, Option<Project>);

fn parse_status(raw: String) -> Result<ProgressStatus, sqlx::Error> {
    raw.parse().map_err(decode_err)
}

fn map_tree_row(r: &PgRow) -> Result<TreeRow, sqlx::Error> {
    let course = Course {
        id: r.try_get("c_id")?,
        user_id: r.try_get("c_user_id")?,
        title: r.try_get("c_title")?,
        group_id: r.try_get("c_group_id")?,
        sector_id: r.try_get("c_sector_id")?,
        status: parse_status(r.try_get("c_status")?)?,
        created_at: r.try_get("c_created_at")?,
        deleted_at: r.try_get("c_deleted_at")?,
    };

    let batch = match r.try_get::<Option<Uuid>, _>("b_id")? {
        Some(id) => Some(Batch {
            id,
            course_id: course.id,
            title: r.try_get("b_title")?,
            position: r.try_get("b_position")?,
        }),
        None => None,
    };

    let project = match (r.try_get::<Option<Uuid>, _>("p_id")?, &batch) {
        (Some(id), Some(batch)) => Some(Project {
            id,
            batch_id: batch.id,
            title: r.try_get("p_title")?,
            position: r.try_get("p_position")?,
            status: parse_status(r.try_get("p_status")?)?,
            ai_evaluation_score: r.try_get("p_ai_evaluation_score")?,
            updated_at: r.try_get("p_updated_at")?,
        }),
        _ => None,
    };

    Ok((course, batch, project))
}

/// Fold ordered join rows into course trees.
///
/// Rows must be grouped by course and, within a course, by batch.
pub fn assemble_trees(rows: Vec<TreeRow>) -> Vec<CourseTree> {
    let mut trees: Vec<CourseTree> = Vec::new();

    for (course, batch, project) in rows {
        if trees.last().map(|t| t.course.id) != Some(course.id) {
            trees.push(CourseTree {
                course,
                batches: Vec::new(),
            });
        }
        let Some(tree) = trees.last_mut() else {
            continue;
        };

        let Some(batch) = batch else {
            continue;
        };
        if tree.batches.last().map(|b| b.batch.id) != Some(batch.id) {
            tree.batches.push(BatchTree {
                batch,
                projects: Vec::new(),
            });
        }

        if let (Some(project), Some(batch_tree)) = (project, tree.batches.last_mut()) {
            batch_tree.projects.push(project);
        }
    }

    trees
}

async fn fetch_trees(
    pool: &PgPool,
    filter: &str,
    binds: &[Uuid],
) -> Result<Vec<CourseTree>, sqlx::Error> {
    let sql = format!("{} WHERE {} {}", TREE_SELECT, filter, TREE_ORDER);
    let mut query = sqlx::query(&sql);
    for id in binds {
        query = query.bind(*id);
    }
    let rows = query.fetch_all(pool).await?;

    let rows = rows
        .iter()
        .map(map_tree_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(assemble_trees(rows))
}

/// Non-deleted courses a user filed under a group, directly or as its sector
pub async fn list_trees_for_user_in_group(
    pool: &PgPool,
    user_id: Uuid,
    group_id: Uuid,
) -> Result<Vec<CourseTree>, sqlx::Error> {
    fetch_trees(
        pool,
        "c.user_id = $1 AND c.deleted_at IS NULL AND (c.group_id = $2 OR c.sector_id = $2)",
        &[user_id, group_id],
    )
    .await
}

/// All non-deleted courses of a user
pub async fn list_trees_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<CourseTree>, sqlx::Error> {
    fetch_trees(pool, "c.user_id = $1 AND c.deleted_at IS NULL", &[user_id]).await
}

/// A single course tree, including soft-deleted courses
pub async fn get_tree(pool: &PgPool, course_id: Uuid) -> Result<Option<CourseTree>, sqlx::Error> {
    let mut trees = fetch_trees(pool, "c.id = $1", &[course_id]).await?;
    Ok(trees.pop())
}

/// Create a course with its batches and projects
pub async fn create_with_tree(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    group_id: Option<Uuid>,
    sector_id: Option<Uuid>,
    batches: &[NewBatch],
) -> Result<CourseTree, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let course_id = Uuid::new_v4();
    let created_at: DateTime<Utc> = sqlx::query(
        r#"
        INSERT INTO courses (id, user_id, title, group_id, sector_id, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        RETURNING created_at
        "#,
    )
    .bind(course_id)
    .bind(user_id)
    .bind(title)
    .bind(group_id)
    .bind(sector_id)
    .bind(ProgressStatus::NotStarted.as_str())
    .fetch_one(&mut *tx)
    .await?
    .try_get("created_at")?;

    let mut batch_trees = Vec::with_capacity(batches.len());
    for (batch_pos, new_batch) in batches.iter().enumerate() {
        let batch = Batch {
            id: Uuid::new_v4(),
            course_id,
            title: new_batch.title.clone(),
            position: batch_pos as i32,
        };
        sqlx::query("INSERT INTO batches (id, course_id, title, position) VALUES ($1, $2, $3, $4)")
            .bind(batch.id)
            .bind(course_id)
            .bind(&batch.title)
            .bind(batch.position)
            .execute(&mut *tx)
            .await?;

        let mut projects = Vec::with_capacity(new_batch.projects.len());
        for (project_pos, project_title) in new_batch.projects.iter().enumerate() {
            let id = Uuid::new_v4();
            let updated_at: DateTime<Utc> = sqlx::query(
                r#"
                INSERT INTO projects (id, batch_id, title, position, status, updated_at)
                VALUES ($1, $2, $3, $4, $5, NOW())
                RETURNING updated_at
                "#,
            )
            .bind(id)
            .bind(batch.id)
            .bind(project_title)
            .bind(project_pos as i32)
            .bind(ProgressStatus::NotStarted.as_str())
            .fetch_one(&mut *tx)
            .await?
            .try_get("updated_at")?;

            projects.push(Project {
                id,
                batch_id: batch.id,
                title: project_title.clone(),
                position: project_pos as i32,
                status: ProgressStatus::NotStarted,
                ai_evaluation_score: None,
                updated_at,
            });
        }

        batch_trees.push(BatchTree { batch, projects });
    }

    tx.commit().await?;

    Ok(CourseTree {
        course: Course {
            id: course_id,
            user_id,
            title: title.to_string(),
            group_id,
            sector_id,
            status: ProgressStatus::NotStarted,
            created_at,
            deleted_at: None,
        },
        batches: batch_trees,
    })
}

/// Store a course status
pub async fn set_status(
    pool: &PgPool,
    course_id: Uuid,
    status: ProgressStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE courses SET status = $2 WHERE id = $1")
        .bind(course_id)
        .bind(status.as_str())
        .execute(pool)
        .await?;

    Ok(())
}

/// Soft delete a course. Returns false if it was missing or already deleted.
pub async fn soft_delete(pool: &PgPool, course_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE courses SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(course_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Course that owns a project
pub async fn course_id_for_project(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT b.course_id
        FROM projects p
        JOIN batches b ON b.id = p.batch_id
        WHERE p.id = $1
        "#,
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| r.try_get("course_id")).transpose()
}
