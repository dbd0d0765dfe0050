//! Public types for the meetings API
use serde::{Deserialize, Serialize};

use crate::scheduling::{AvailabilityResult, CommittedMeeting, ExistingMeeting};

#[derive(Deserialize)]
pub struct MeetingsQuery {
    pub user_id: String,
    pub date: String,
}

#[derive(Serialize, Deserialize)]
pub struct MeetingsResponse {
    pub user_id: String,
    pub date: String,
    pub meetings: Vec<ExistingMeeting>,
}

/// Fields are optional so a missing one is reported by name instead of
/// as a generic body rejection.
#[derive(Deserialize, Default)]
pub struct AvailabilityRequest {
    pub organizer_id: Option<String>,
    #[serde(default)]
    pub invitee_ids: Vec<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AvailabilityResponse {
    #[serde(flatten)]
    pub result: AvailabilityResult,
    pub message: String,
}

#[derive(Deserialize, Default)]
pub struct ScheduleRequest {
    pub organizer_id: Option<String>,
    #[serde(default)]
    pub invitee_ids: Vec<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: Option<String>,
    pub title: Option<String>,
    /// The `available` set returned by the last availability check
    #[serde(default)]
    pub available: Vec<String>,
}

/// Direct create against the schedule store. Every participant is
/// checked by the store and an overlap is rejected with 409.
#[derive(Deserialize, Default)]
pub struct CreateMeetingRequest {
    pub organizer_id: Option<String>,
    #[serde(default)]
    pub invitee_ids: Vec<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: Option<String>,
    pub title: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct MeetingResponse {
    pub message: String,
    pub meeting: CommittedMeeting,
}
