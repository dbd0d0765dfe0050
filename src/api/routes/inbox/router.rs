//! Router for the inbox API

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
};

use super::public;
use crate::api::public::NotFound;
use crate::api::state::AppState;
use crate::notify::find_inbox_messages;

type SharedState = Arc<AppState>;

// Direct messages delivered to a user, newest first
async fn inbox(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<public::InboxMessage>>, crate::api::public::ApiError> {
    if state.directory.lookup(&user_id).await?.is_none() {
        return Err(NotFound(format!("User {}", user_id)).into());
    }
    let messages = find_inbox_messages(&state.db, &user_id).await?;
    Ok(Json(messages))
}

/// Create the inbox router
pub fn router() -> Router<SharedState> {
    Router::new().route("/{user_id}", axum::routing::get(inbox))
}
