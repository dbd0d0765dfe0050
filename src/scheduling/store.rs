use async_trait::async_trait;
use chrono::NaiveDate;

use super::models::{CommittedMeeting, ExistingMeeting, NewMeeting};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store's own overlap check found a participant who is busy.
    /// Nothing was written.
    #[error("user {user_id} already has meeting {meeting_id} at that time")]
    Conflict { user_id: String, meeting_id: String },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<tokio_rusqlite::Error> for StoreError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        Self::Backend(err.into())
    }
}

/// Authoritative persistence of meetings. `create_meeting` must reject
/// a meeting that overlaps an existing commitment of the organizer or
/// any listed invitee, atomically with respect to other creates.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Meetings the user takes part in on `date`. No meetings is an
    /// empty list, not an error.
    async fn list_meetings(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ExistingMeeting>, StoreError>;

    async fn create_meeting(&self, meeting: NewMeeting) -> Result<CommittedMeeting, StoreError>;
}
