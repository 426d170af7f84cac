//! Global leaderboard routes

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ApiResult, DbResultExt};
use crate::state::AppState;
use common::models::LeaderboardEntry;

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_limit")]
    limit: i32,
}

fn default_limit() -> i32 {
    25
}

pub async fn global(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let leaderboard = db::leaderboard::get_leaderboard(&state.pool, query.limit.clamp(1, 100))
        .await
        .db_err()?;

    Ok(Json(leaderboard))
}
