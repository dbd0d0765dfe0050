//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;

use crate::directory::DirectoryError;
use crate::scheduling::{Recovery, SchedulingError};

// Errors

/// A requested resource doesn't exist.
#[derive(Debug, thiserror::Error)]
#[error("{0} not found")]
pub struct NotFound(pub String);

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery: Option<Recovery>,
}

pub struct ApiError(anyhow::Error);

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        if let Some(err) = self.0.downcast_ref::<SchedulingError>() {
            let status = match err {
                SchedulingError::Validation { .. } => StatusCode::BAD_REQUEST,
                SchedulingError::NothingToSchedule(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SchedulingError::LookupFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
                SchedulingError::OrganizerNoLongerAvailable { .. }
                | SchedulingError::SchedulingConflict(_) => StatusCode::CONFLICT,
                SchedulingError::CommitFailed(_) => StatusCode::BAD_GATEWAY,
            };
            let body = ErrorBody {
                error: err.to_string(),
                kind: err.kind().to_string(),
                recovery: Some(err.recovery()),
            };
            return (status, body);
        }

        if let Some(err) = self.0.downcast_ref::<DirectoryError>() {
            let (status, kind) = match err {
                DirectoryError::Invalid { .. } => (StatusCode::BAD_REQUEST, "invalid_user"),
                DirectoryError::Duplicate { .. } => (StatusCode::CONFLICT, "duplicate_user"),
                DirectoryError::Backend(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            };
            let body = ErrorBody {
                error: err.to_string(),
                kind: kind.to_string(),
                recovery: (!status.is_server_error()).then_some(Recovery::FixInput),
            };
            return (status, body);
        }

        if let Some(err) = self.0.downcast_ref::<NotFound>() {
            let body = ErrorBody {
                error: err.to_string(),
                kind: "not_found".to_string(),
                recovery: Some(Recovery::FixInput),
            };
            return (StatusCode::NOT_FOUND, body);
        }

        let body = ErrorBody {
            error: format!("Something went wrong: {}", self.0),
            kind: "internal".to_string(),
            recovery: None,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, body)
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        // Always log the error
        if status.is_server_error() {
            tracing::error!("{:#}", self.0);
        } else {
            tracing::info!("Request rejected with {}: {}", status, self.0);
        }

        (status, Json(body)).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` (or any domain error) to turn them into
/// `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod inbox {
    pub use crate::api::routes::inbox::public::*;
}

pub mod meetings {
    pub use crate::api::routes::meetings::public::*;
}

pub mod push {
    pub use crate::api::routes::push::public::*;
}

pub mod users {
    pub use crate::api::routes::users::public::*;
}
