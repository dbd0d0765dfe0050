//! API routes module

pub mod inbox;
pub mod meetings;
pub mod push;
pub mod users;

use std::sync::Arc;

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<AppState>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Roster routes
        .nest("/users", users::router())
        // Availability and scheduling routes
        .nest("/meetings", meetings::router())
        // Direct message routes
        .nest("/inbox", inbox::router())
        // Push notification routes
        .nest("/push", push::router())
}
