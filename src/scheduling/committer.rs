//! Turns a checked meeting request into a stored meeting.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::error::SchedulingError;
use super::models::{AvailabilityResult, CommittedMeeting, MeetingRequest, NewMeeting};
use super::resolver::find_conflict;
use super::store::{ScheduleStore, StoreError};
use crate::directory::{User, UserDirectory};
use crate::notify::{DispatchReport, NotificationDispatcher, broadcast_invitation};

pub fn invitation_message(organizer: &User, meeting: &CommittedMeeting) -> String {
    format!(
        "You have been invited to a meeting by {} on {}. Reason: {}",
        organizer.name,
        meeting.when(),
        meeting.reason
    )
}

#[derive(Clone)]
pub struct SchedulingCommitter {
    store: Arc<dyn ScheduleStore>,
    directory: Arc<dyn UserDirectory>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl SchedulingCommitter {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        directory: Arc<dyn UserDirectory>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            directory,
            dispatcher,
        }
    }

    /// Store the meeting with the invitees from `last_result` that were
    /// free and notify them in the background.
    ///
    /// Time passes between the availability check and this call, so
    /// the organizer's schedule is read again first. The store then
    /// makes the final call: a conflict it detects is returned as
    /// `SchedulingConflict` and is never retried here.
    pub async fn commit(
        &self,
        request: &MeetingRequest,
        last_result: &AvailabilityResult,
    ) -> Result<CommittedMeeting, SchedulingError> {
        let (meeting, _notifications) = self.commit_and_track(request, last_result).await?;
        Ok(meeting)
    }

    /// Same as [`commit`](Self::commit) but hands back the notification
    /// task so short-lived callers can wait for delivery before exiting.
    pub async fn commit_and_track(
        &self,
        request: &MeetingRequest,
        last_result: &AvailabilityResult,
    ) -> Result<(CommittedMeeting, JoinHandle<DispatchReport>), SchedulingError> {
        if last_result.organizer_blocked {
            return Err(SchedulingError::NothingToSchedule(
                "the organizer is not available at this time",
            ));
        }
        if last_result.available.is_empty() {
            return Err(SchedulingError::NothingToSchedule(
                "no available invitees to schedule a meeting with",
            ));
        }
        if last_result.available.contains(&request.organizer_id) {
            return Err(SchedulingError::validation(
                "invitees",
                "the organizer can't be invited to their own meeting",
            ));
        }

        let organizer_meetings = self
            .store
            .list_meetings(&request.organizer_id, request.date)
            .await
            .map_err(|err| SchedulingError::LookupFailure {
                user_id: request.organizer_id.clone(),
                source: err.into(),
            })?;
        if let Some(conflict) = find_conflict(&organizer_meetings, &request.interval) {
            tracing::info!(
                "Organizer {} became busy on {} {} (meeting {}), discarding availability",
                request.organizer_id,
                request.date,
                request.interval,
                conflict.id
            );
            return Err(SchedulingError::OrganizerNoLongerAvailable {
                meeting_id: conflict.id.clone(),
            });
        }

        let mut invitee_ids: Vec<String> = Vec::with_capacity(last_result.available.len());
        for id in &last_result.available {
            if !invitee_ids.contains(id) {
                invitee_ids.push(id.clone());
            }
        }
        let title = match request.title.trim() {
            "" => super::models::DEFAULT_MEETING_TITLE.to_string(),
            title => title.to_string(),
        };
        let new_meeting = NewMeeting {
            organizer_id: request.organizer_id.clone(),
            invitee_ids,
            date: request.date,
            interval: request.interval,
            title,
            reason: request.reason.clone(),
        };

        let meeting = match self.store.create_meeting(new_meeting).await {
            Ok(meeting) => meeting,
            Err(StoreError::Conflict {
                user_id,
                meeting_id,
            }) => {
                return Err(SchedulingError::SchedulingConflict(format!(
                    "user {} was booked into meeting {} before this one could be saved",
                    user_id, meeting_id
                )));
            }
            Err(StoreError::Backend(err)) => {
                tracing::error!("Failed to store meeting for {}: {}", request.organizer_id, err);
                return Err(SchedulingError::CommitFailed(err));
            }
        };

        tracing::info!(
            "Scheduled meeting {} on {} for {} with invitees {:?}",
            meeting.id,
            meeting.when(),
            meeting.organizer_id,
            meeting.invitee_ids
        );

        let notifications = tokio::spawn(notify_invitees(
            Arc::clone(&self.directory),
            Arc::clone(&self.dispatcher),
            meeting.clone(),
        ));

        Ok((meeting, notifications))
    }
}

async fn resolve_user(directory: &dyn UserDirectory, id: &str) -> Option<User> {
    match directory.lookup(id).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            tracing::warn!("User {} is not in the directory", id);
            None
        }
        Err(err) => {
            tracing::error!("Failed to look up user {}: {}", id, err);
            None
        }
    }
}

/// Tell every invitee of a freshly stored meeting about it. Errors are
/// logged and reported, never returned.
async fn notify_invitees(
    directory: Arc<dyn UserDirectory>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    meeting: CommittedMeeting,
) -> DispatchReport {
    let organizer = resolve_user(directory.as_ref(), &meeting.organizer_id)
        .await
        .unwrap_or_else(|| User::new(&meeting.organizer_id, &meeting.organizer_id, ""));

    let mut recipients = Vec::with_capacity(meeting.invitee_ids.len());
    let mut unresolved = Vec::new();
    for id in &meeting.invitee_ids {
        match resolve_user(directory.as_ref(), id).await {
            Some(user) => recipients.push(user),
            None => unresolved.push(id.clone()),
        }
    }

    let message = invitation_message(&organizer, &meeting);
    let mut report = broadcast_invitation(dispatcher, organizer, recipients, message).await;
    report.failed.extend(unresolved);

    if !report.failed.is_empty() {
        tracing::warn!(
            "Meeting {} is booked but {} invitee(s) were not notified: {:?}",
            meeting.id,
            report.failed.len(),
            report.failed
        );
    }
    report
}
