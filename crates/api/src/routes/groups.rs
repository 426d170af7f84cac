//! Group routes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use common::models::{Group, GroupLeaderboardEntry, GroupMembership, GroupType};
use processor::{ActivityEvent, PipelineReport};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, DbResultExt, OptionExt};
use crate::routes::users::find_user;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub group_type: Option<GroupType>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub group_type: Option<GroupType>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct GroupWithMembers {
    #[serde(flatten)]
    pub group: Group,
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Serialize)]
pub struct GroupMember {
    pub id: Uuid,
    pub username: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct JoinResponse {
    pub membership: GroupMembership,
    pub scores: Option<PipelineReport>,
}

async fn find_group(state: &AppState, group_id: Uuid) -> ApiResult<Group> {
    db::groups::get_group(&state.pool, group_id)
        .await
        .db_err()?
        .not_found(format!("Group {} not found", group_id))
}

/// List groups, optionally by type
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Group>>> {
    let groups = db::groups::list_groups(&state.pool, query.group_type)
        .await
        .db_err()?;
    Ok(Json(groups))
}

/// Get a group with its active members
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
) -> ApiResult<Json<GroupWithMembers>> {
    let group = find_group(&state, group_id).await?;

    let members = db::groups::list_active_members(&state.pool, group.id)
        .await
        .db_err()?
        .into_iter()
        .map(|(id, username, joined_at)| GroupMember {
            id,
            username,
            joined_at,
        })
        .collect();

    Ok(Json(GroupWithMembers { group, members }))
}

/// Create a new group
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Group name is required".to_string()));
    }

    let group = db::groups::create_group(
        &state.pool,
        name,
        req.description.as_deref(),
        req.group_type.unwrap_or(GroupType::Custom),
    )
    .await
    .db_err()?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// Delete a group and rescore its former members
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let member_ids = db::groups::delete_group(&state.pool, group_id)
        .await
        .db_err()?
        .not_found(format!("Group {} not found", group_id))?;

    if !member_ids.is_empty() {
        state
            .score_activity(ActivityEvent::GroupDeleted {
                group_id,
                member_ids,
            })
            .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Join a group and score the new member
pub async fn join(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
    Json(req): Json<JoinRequest>,
) -> ApiResult<(StatusCode, Json<JoinResponse>)> {
    let group = find_group(&state, group_id).await?;
    let user = find_user(&state, &req.username).await?;

    let membership = db::groups::join(&state.pool, group.id, user.id)
        .await
        .db_err()?;

    let scores = state
        .score_activity(ActivityEvent::GroupJoined {
            user_id: user.id,
            group_id: group.id,
        })
        .await;

    Ok((StatusCode::CREATED, Json(JoinResponse { membership, scores })))
}

/// Leave a group
pub async fn leave(
    State(state): State<Arc<AppState>>,
    Path((group_id, username)): Path<(Uuid, String)>,
) -> ApiResult<StatusCode> {
    let group = find_group(&state, group_id).await?;
    let user = find_user(&state, &username).await?;

    let left = db::groups::leave(&state.pool, group.id, user.id)
        .await
        .db_err()?;
    if !left {
        return Err(ApiError::NotFound(format!(
            "User '{}' is not a member of group {}",
            username, group.id
        )));
    }

    state
        .score_activity(ActivityEvent::GroupLeft {
            user_id: user.id,
            group_id: group.id,
        })
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Group leaderboard by rank
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
    Query(params): Query<LeaderboardQuery>,
) -> ApiResult<Json<Vec<GroupLeaderboardEntry>>> {
    let group = find_group(&state, group_id).await?;
    let limit = params.limit.unwrap_or(50).clamp(1, 200);

    let leaderboard = db::group_scores::leaderboard(&state.pool, group.id, limit)
        .await
        .db_err()?;

    Ok(Json(leaderboard))
}
