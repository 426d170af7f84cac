//! Course routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::models::{CourseTree, GroupType};
use db::courses::NewBatch;
use processor::{ActivityEvent, PipelineReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, DbResultExt, OptionExt};
use crate::routes::users::find_user;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub username: String,
    pub title: String,
    pub group_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    #[serde(default)]
    pub batches: Vec<BatchRequest>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub title: String,
    #[serde(default)]
    pub projects: Vec<String>,
}

#[derive(Serialize)]
pub struct CourseResponse {
    pub course: CourseTree,
    pub scores: Option<PipelineReport>,
}

fn validate(req: &CreateCourseRequest) -> ApiResult<()> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Course title is required".to_string()));
    }
    if req.batches.iter().any(|b| b.title.trim().is_empty()) {
        return Err(ApiError::BadRequest("Batch titles are required".to_string()));
    }
    if req
        .batches
        .iter()
        .flat_map(|b| b.projects.iter())
        .any(|p| p.trim().is_empty())
    {
        return Err(ApiError::BadRequest("Project titles are required".to_string()));
    }
    Ok(())
}

/// Create a course with its batches and projects
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCourseRequest>,
) -> ApiResult<(StatusCode, Json<CourseResponse>)> {
    validate(&req)?;
    let user = find_user(&state, &req.username).await?;

    if let Some(group_id) = req.group_id {
        db::groups::get_group(&state.pool, group_id)
            .await
            .db_err()?
            .not_found(format!("Group {} not found", group_id))?;
    }
    if let Some(sector_id) = req.sector_id {
        let sector = db::groups::get_group(&state.pool, sector_id)
            .await
            .db_err()?
            .not_found(format!("Sector {} not found", sector_id))?;
        if sector.group_type != GroupType::Category {
            return Err(ApiError::BadRequest(format!(
                "Group {} is not a category",
                sector_id
            )));
        }
    }

    let batches: Vec<NewBatch> = req
        .batches
        .into_iter()
        .map(|b| NewBatch {
            title: b.title,
            projects: b.projects,
        })
        .collect();

    let course = db::courses::create_with_tree(
        &state.pool,
        user.id,
        req.title.trim(),
        req.group_id,
        req.sector_id,
        &batches,
    )
    .await
    .db_err()?;

    let scores = state
        .score_activity(ActivityEvent::CourseCreated {
            course_id: course.course.id,
        })
        .await;

    Ok((StatusCode::CREATED, Json(CourseResponse { course, scores })))
}

/// Soft delete a course and rescore its groups
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = db::courses::soft_delete(&state.pool, course_id)
        .await
        .db_err()?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Course {} not found", course_id)));
    }

    state
        .score_activity(ActivityEvent::CourseDeleted { course_id })
        .await;

    Ok(StatusCode::NO_CONTENT)
}
