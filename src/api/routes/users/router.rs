//! Router for the users API

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode};

use super::public;
use crate::api::state::AppState;
use crate::directory::{User, create_user};

type SharedState = Arc<AppState>;

// List everyone who can be invited to a meeting
async fn list_users(
    State(state): State<SharedState>,
) -> Result<Json<Vec<User>>, crate::api::public::ApiError> {
    let users = state.directory.list().await?;
    Ok(Json(users))
}

// Register a new user in the roster. Blank fields and duplicate ids or
// emails are rejected by `create_user`
async fn add_user(
    State(state): State<SharedState>,
    Json(payload): Json<public::CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), crate::api::public::ApiError> {
    let user = create_user(
        &state.db,
        payload.id.as_deref(),
        &payload.name,
        &payload.email,
    )
    .await?;
    tracing::info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Create the users router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::get(list_users).post(add_user))
}
