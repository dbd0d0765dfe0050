//! Router for the push API

use std::sync::Arc;

use axum::{Json, Router, extract::State};
use serde_json::Value;

use super::public;
use crate::api::public::NotFound;
use crate::api::state::AppState;
use crate::notify::{PushSubscription, upsert_push_subscription};
use crate::scheduling::SchedulingError;

type SharedState = Arc<AppState>;

// Register a user's device for meeting invitation push notifications
async fn push_subscription(
    State(state): State<SharedState>,
    Json(subscription): Json<public::PushSubscriptionRequest>,
) -> Result<Json<Value>, crate::api::public::ApiError> {
    let p256dh = subscription
        .keys
        .get("p256dh")
        .ok_or_else(|| SchedulingError::validation("keys", "missing p256dh key"))?
        .clone();
    let auth = subscription
        .keys
        .get("auth")
        .ok_or_else(|| SchedulingError::validation("keys", "missing auth key"))?
        .clone();

    if state.directory.lookup(&subscription.user_id).await?.is_none() {
        return Err(NotFound(format!("User {}", subscription.user_id)).into());
    }

    upsert_push_subscription(
        &state.db,
        PushSubscription {
            endpoint: subscription.endpoint,
            user_id: subscription.user_id,
            p256dh,
            auth,
        },
    )
    .await?;

    Ok(Json(serde_json::json!({"success": true})))
}

/// Create the push router
pub fn router() -> Router<SharedState> {
    Router::new().route("/subscribe", axum::routing::post(push_subscription))
}
