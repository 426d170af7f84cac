//! Project progress routes

use axum::{
    extract::{Path, State},
    Json,
};
use common::models::{ProgressStatus, Project};
use processor::{ActivityEvent, PipelineReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, DbResultExt, OptionExt};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub status: ProgressStatus,
    pub ai_evaluation_score: Option<f64>,
}

#[derive(Serialize)]
pub struct ProjectUpdateResponse {
    pub project: Project,
    /// Absent when the score pipeline failed; the update itself is kept
    pub scores: Option<PipelineReport>,
}

fn validate_ai_score(score: Option<f64>) -> ApiResult<()> {
    match score {
        Some(s) if !s.is_finite() || !(0.0..=100.0).contains(&s) => Err(ApiError::BadRequest(
            "ai_evaluation_score must be between 0 and 100".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Update a project's status and AI evaluation score
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectUpdateResponse>> {
    validate_ai_score(req.ai_evaluation_score)?;

    let project =
        db::projects::update_progress(&state.pool, project_id, req.status, req.ai_evaluation_score)
            .await
            .db_err()?
            .not_found(format!("Project {} not found", project_id))?;

    let scores = state
        .score_activity(ActivityEvent::ProjectUpdated { project_id })
        .await;

    Ok(Json(ProjectUpdateResponse { project, scores }))
}
