//! Score recalculation routes

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RecalcResponse {
    pub status: String,
    pub group_scores_updated: usize,
    pub groups_ranked: usize,
    pub users_updated: usize,
    pub failures: usize,
}

pub async fn trigger(State(state): State<Arc<AppState>>) -> ApiResult<Json<RecalcResponse>> {
    info!("Recalculation triggered via API");

    let stats = processor::recalculate_all(&state.pool, &state.global_calculator)
        .await
        .map_err(|e| ApiError::Internal(format!("Recalculation failed: {}", e)))?;

    Ok(Json(RecalcResponse {
        status: "complete".to_string(),
        group_scores_updated: stats.group_scores_updated,
        groups_ranked: stats.groups_ranked,
        users_updated: stats.users_updated,
        failures: stats.failures,
    }))
}
