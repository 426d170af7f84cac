//! API routes

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::state::AppState;

pub mod courses;
pub mod groups;
pub mod health;
pub mod leaderboard;
pub mod projects;
pub mod recalc;
pub mod users;

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .route("/api/users", post(users::create))
        .route("/api/users/:username", get(users::get))
        .route("/api/users/:username/github", put(users::ingest_github))
        .route("/api/users/:username/score", post(users::recalculate_score))
        .route("/api/users/:username/analytics", get(users::analytics))
        .route("/api/users/:username/performance", get(users::performance))
        .route("/api/users/:username/history", get(users::history))
        .route("/api/leaderboard", get(leaderboard::global))
        .route("/api/groups", get(groups::list).post(groups::create))
        .route("/api/groups/:id", get(groups::get).delete(groups::delete))
        .route("/api/groups/:id/members", post(groups::join))
        .route(
            "/api/groups/:id/members/:username",
            delete(groups::leave),
        )
        .route("/api/groups/:id/leaderboard", get(groups::leaderboard))
        .route("/api/courses", post(courses::create))
        .route("/api/courses/:id", delete(courses::delete))
        .route("/api/projects/:id", patch(projects::update))
        .route("/api/recalculate", post(recalc::trigger))
        .with_state(state)
}
