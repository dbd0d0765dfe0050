//! Router for the meetings API

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::Query;
use chrono::NaiveDate;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::directory::{User, UserDirectory};
use crate::scheduling::{
    AvailabilityResult, DEFAULT_MEETING_TITLE, MeetingRequest, NewMeeting, SchedulingError,
    StoreError, check_availability, parse_slot,
};

type SharedState = Arc<AppState>;

fn required_text(field: &'static str, value: Option<String>) -> Result<String, SchedulingError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(SchedulingError::validation(field, "is required")),
    }
}

async fn resolve_organizer(
    directory: &dyn UserDirectory,
    organizer_id: Option<String>,
) -> Result<User, ApiError> {
    let organizer_id = required_text("organizer_id", organizer_id)?;
    directory.lookup(&organizer_id).await?.ok_or_else(|| {
        SchedulingError::validation("organizer_id", format!("unknown user {}", organizer_id))
            .into()
    })
}

async fn resolve_invitees(
    directory: &dyn UserDirectory,
    invitee_ids: &[String],
) -> Result<Vec<User>, ApiError> {
    if invitee_ids.is_empty() {
        return Err(SchedulingError::validation("invitees", "select at least one person").into());
    }
    let mut invitees = Vec::with_capacity(invitee_ids.len());
    for id in invitee_ids {
        match directory.lookup(id).await? {
            Some(user) => invitees.push(user),
            None => {
                return Err(
                    SchedulingError::validation("invitee_ids", format!("unknown user {}", id))
                        .into(),
                );
            }
        }
    }
    Ok(invitees)
}

// Meetings a user takes part in on a given date
async fn list_meetings(
    State(state): State<SharedState>,
    Query(params): Query<public::MeetingsQuery>,
) -> Result<Json<public::MeetingsResponse>, ApiError> {
    let date = NaiveDate::parse_from_str(params.date.trim(), "%Y-%m-%d")
        .map_err(|_| SchedulingError::validation("date", "expected YYYY-MM-DD"))?;

    let meetings = state
        .store
        .list_meetings(&params.user_id, date)
        .await
        .map_err(|err| SchedulingError::LookupFailure {
            user_id: params.user_id.clone(),
            source: err.into(),
        })?;

    Ok(Json(public::MeetingsResponse {
        user_id: params.user_id,
        date: params.date,
        meetings,
    }))
}

// Work out which invitees are free for a proposed slot
async fn check_meeting_availability(
    State(state): State<SharedState>,
    Json(payload): Json<public::AvailabilityRequest>,
) -> Result<Json<public::AvailabilityResponse>, ApiError> {
    let (date, interval) = parse_slot(
        payload.date.as_deref(),
        payload.start_time.as_deref(),
        payload.end_time.as_deref(),
    )?;
    let reason = required_text("reason", payload.reason)?;
    let organizer = resolve_organizer(state.directory.as_ref(), payload.organizer_id).await?;
    let invitees = resolve_invitees(state.directory.as_ref(), &payload.invitee_ids).await?;

    let result = check_availability(
        state.store.as_ref(),
        &organizer,
        &invitees,
        date,
        interval,
        &reason,
    )
    .await?;

    let message = result.status_message();
    Ok(Json(public::AvailabilityResponse { result, message }))
}

// Commit a meeting with the invitees the last check found available
async fn schedule_meeting(
    State(state): State<SharedState>,
    Json(payload): Json<public::ScheduleRequest>,
) -> Result<(StatusCode, Json<public::MeetingResponse>), ApiError> {
    let (date, interval) = parse_slot(
        payload.date.as_deref(),
        payload.start_time.as_deref(),
        payload.end_time.as_deref(),
    )?;
    let reason = required_text("reason", payload.reason)?;
    let organizer = resolve_organizer(state.directory.as_ref(), payload.organizer_id).await?;

    if let Some(stray) = payload
        .available
        .iter()
        .find(|id| !payload.invitee_ids.contains(*id))
    {
        return Err(SchedulingError::validation(
            "available",
            format!("{} was not one of the requested invitees", stray),
        )
        .into());
    }

    let request = MeetingRequest::new(&organizer.id, payload.invitee_ids, date, interval, &reason)
        .with_title(payload.title.as_deref().unwrap_or(DEFAULT_MEETING_TITLE));
    let last_result = AvailabilityResult {
        available: payload.available,
        ..Default::default()
    };

    let meeting = state.committer.commit(&request, &last_result).await?;

    Ok((
        StatusCode::CREATED,
        Json(public::MeetingResponse {
            message: "Meeting scheduled and saved!".to_string(),
            meeting,
        }),
    ))
}

// Store a meeting directly, subject only to the store's own conflict check
async fn create_meeting(
    State(state): State<SharedState>,
    Json(payload): Json<public::CreateMeetingRequest>,
) -> Result<(StatusCode, Json<public::MeetingResponse>), ApiError> {
    let (date, interval) = parse_slot(
        payload.date.as_deref(),
        payload.start_time.as_deref(),
        payload.end_time.as_deref(),
    )?;
    let organizer_id = required_text("organizer_id", payload.organizer_id)?;
    let reason = required_text("reason", payload.reason)?;
    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MEETING_TITLE.to_string());

    let new_meeting = NewMeeting {
        organizer_id,
        invitee_ids: payload.invitee_ids,
        date,
        interval,
        title,
        reason,
    };

    let meeting = match state.store.create_meeting(new_meeting).await {
        Ok(meeting) => meeting,
        Err(StoreError::Conflict {
            user_id,
            meeting_id,
        }) => {
            return Err(SchedulingError::SchedulingConflict(format!(
                "user {} already has meeting {} at that time",
                user_id, meeting_id
            ))
            .into());
        }
        Err(StoreError::Backend(err)) => return Err(SchedulingError::CommitFailed(err).into()),
    };

    Ok((
        StatusCode::CREATED,
        Json(public::MeetingResponse {
            message: "Meeting scheduled successfully".to_string(),
            meeting,
        }),
    ))
}

/// Create the meetings router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_meetings).post(create_meeting))
        .route("/availability", post(check_meeting_availability))
        .route("/schedule", post(schedule_meeting))
}
