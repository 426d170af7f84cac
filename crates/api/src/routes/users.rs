//! User routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use common::models::{GithubActivity, PerformanceSnapshot, Score, User, UserBadge};
use processor::{ActivityEvent, GroupComparison, UserAnalytics};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, DbResultExt, OptionExt};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub display_name: Option<String>,
}

#[derive(Serialize)]
pub struct UserProfile {
    pub user: User,
    pub score: Option<Score>,
    pub badges: Vec<UserBadge>,
    pub rank: Option<i32>,
}

#[derive(Deserialize)]
pub struct ScoreQuery {
    #[serde(default)]
    pub force: bool,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    pub recalculated: bool,
    pub score: Score,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub group_id: Option<Uuid>,
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    30
}

fn validate_username(username: &str) -> ApiResult<()> {
    let valid = !username.is_empty()
        && username.len() <= 39
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "username must be 1-39 characters of letters, digits, '-' or '_'".to_string(),
        ))
    }
}

fn validate_activity(activity: &GithubActivity) -> ApiResult<()> {
    let counters = [
        activity.commits,
        activity.pull_requests,
        activity.issues,
        activity.reviews,
        activity.current_streak,
        activity.longest_streak,
    ];
    if counters.iter().any(|c| *c < 0) {
        return Err(ApiError::BadRequest(
            "GitHub counters must not be negative".to_string(),
        ));
    }
    Ok(())
}

pub(crate) async fn find_user(state: &AppState, username: &str) -> ApiResult<User> {
    db::users::get_by_username(&state.pool, username)
        .await
        .db_err()?
        .not_found(format!("User '{}' not found", username))
}

/// Create a user
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    validate_username(&req.username)?;

    if db::users::get_by_username(&state.pool, &req.username)
        .await
        .db_err()?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "User '{}' already exists",
            req.username
        )));
    }

    let user = db::users::create(&state.pool, &req.username, req.display_name.as_deref())
        .await
        .db_err()?;
    db::scores::ensure(&state.pool, user.id).await.db_err()?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// User profile with score, badges and global rank
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    let user = find_user(&state, &username).await?;

    let score = db::scores::get_for_user(&state.pool, user.id)
        .await
        .db_err()?;
    let badges = db::badges::list_for_user(&state.pool, user.id)
        .await
        .db_err()?;
    let rank = db::leaderboard::get_user_rank(&state.pool, user.id)
        .await
        .db_err()?;

    Ok(Json(UserProfile {
        user,
        score,
        badges,
        rank,
    }))
}

/// Store GitHub counters from the sync job and rescore the user
pub async fn ingest_github(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(activity): Json<GithubActivity>,
) -> ApiResult<Json<Score>> {
    validate_activity(&activity)?;
    let user = find_user(&state, &username).await?;

    let stored = db::scores::set_github_activity(&state.pool, user.id, &activity)
        .await
        .db_err()?;

    let score = state
        .score_activity(ActivityEvent::GithubSynced { user_id: user.id })
        .await
        .and_then(|mut report| report.scores.pop())
        .unwrap_or(stored);

    Ok(Json(score))
}

/// Recompute the global score, honouring the staleness window unless forced
pub async fn recalculate_score(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<ScoreQuery>,
) -> ApiResult<Json<ScoreResponse>> {
    let user = find_user(&state, &username).await?;

    let update = state
        .global_calculator
        .update_global_score(user.id, query.force)
        .await?;

    Ok(Json(ScoreResponse {
        recalculated: update.was_recalculated(),
        score: update.into_score(),
    }))
}

pub async fn analytics(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserAnalytics>> {
    let user = find_user(&state, &username).await?;
    let analytics = state.analytics.user_overview(user.id).await?;
    Ok(Json(analytics))
}

pub async fn performance(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Json<Vec<GroupComparison>>> {
    let user = find_user(&state, &username).await?;
    let comparisons = state.performance.compare_all(user.id).await?;
    Ok(Json(comparisons))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<PerformanceSnapshot>>> {
    let user = find_user(&state, &username).await?;
    let snapshots = state
        .performance
        .history(user.id, query.group_id, query.limit.clamp(1, 365))
        .await?;
    Ok(Json(snapshots))
}
