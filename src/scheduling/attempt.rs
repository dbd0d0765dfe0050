//! A single check-then-commit scheduling attempt as an explicit state
//! machine:
//!
//! ```text
//! Idle -> Checking -> {Blocked | Checked} -> Committing -> {Committed | Conflict | Failed}
//! ```
//!
//! `Blocked`, `Conflict` and `Failed` end the attempt. Only a new
//! `check` (which produces a fresh availability result) may follow.

use std::mem;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::task::JoinHandle;

use super::committer::SchedulingCommitter;
use super::error::SchedulingError;
use super::interval::TimeInterval;
use super::models::{AvailabilityResult, CommittedMeeting, MeetingRequest};
use super::resolver::check_availability;
use super::store::ScheduleStore;
use crate::directory::User;
use crate::notify::DispatchReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    Checking,
    Blocked,
    Checked(AvailabilityResult),
    Committing,
    Committed(CommittedMeeting),
    Conflict,
    Failed,
}

impl AttemptState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Blocked => "blocked",
            Self::Checked(_) => "checked",
            Self::Committing => "committing",
            Self::Committed(_) => "committed",
            Self::Conflict => "conflict",
            Self::Failed => "failed",
        }
    }
}

pub struct SchedulingAttempt {
    store: Arc<dyn ScheduleStore>,
    committer: SchedulingCommitter,
    request: Option<MeetingRequest>,
    state: AttemptState,
    notifications: Option<JoinHandle<DispatchReport>>,
}

impl SchedulingAttempt {
    pub fn new(store: Arc<dyn ScheduleStore>, committer: SchedulingCommitter) -> Self {
        Self {
            store,
            committer,
            request: None,
            state: AttemptState::Idle,
            notifications: None,
        }
    }

    pub fn state(&self) -> &AttemptState {
        &self.state
    }

    /// Start a fresh availability check, replacing any earlier result.
    #[allow(clippy::too_many_arguments)]
    pub async fn check(
        &mut self,
        organizer: &User,
        invitees: &[User],
        date: NaiveDate,
        interval: TimeInterval,
        reason: &str,
        title: &str,
    ) -> Result<AvailabilityResult, SchedulingError> {
        self.state = AttemptState::Checking;
        self.request = None;

        let result = match check_availability(
            self.store.as_ref(),
            organizer,
            invitees,
            date,
            interval,
            reason,
        )
        .await
        {
            Ok(result) => result,
            Err(err) => {
                self.state = AttemptState::Idle;
                return Err(err);
            }
        };

        let invitee_ids = invitees.iter().map(|u| u.id.clone()).collect();
        self.request = Some(
            MeetingRequest::new(&organizer.id, invitee_ids, date, interval, reason)
                .with_title(title),
        );
        self.state = if result.organizer_blocked {
            AttemptState::Blocked
        } else {
            AttemptState::Checked(result.clone())
        };

        Ok(result)
    }

    /// Commit the last checked result. Only valid right after a check
    /// that found the organizer and at least one invitee free.
    pub async fn commit(&mut self) -> Result<CommittedMeeting, SchedulingError> {
        let last_result = match &self.state {
            AttemptState::Checked(result) if result.is_schedulable() => result.clone(),
            AttemptState::Checked(_) => {
                return Err(SchedulingError::NothingToSchedule(
                    "no available invitees to schedule a meeting with",
                ));
            }
            AttemptState::Blocked => {
                return Err(SchedulingError::NothingToSchedule(
                    "the organizer is not available at this time",
                ));
            }
            _ => {
                return Err(SchedulingError::NothingToSchedule(
                    "check availability before scheduling",
                ));
            }
        };
        let Some(request) = self.request.clone() else {
            return Err(SchedulingError::NothingToSchedule(
                "check availability before scheduling",
            ));
        };

        let previous = mem::replace(&mut self.state, AttemptState::Committing);
        tracing::debug!("Attempt moving from {} to committing", previous.name());

        match self.committer.commit_and_track(&request, &last_result).await {
            Ok((meeting, notifications)) => {
                self.notifications = Some(notifications);
                self.state = AttemptState::Committed(meeting.clone());
                Ok(meeting)
            }
            Err(err) => {
                self.state = match &err {
                    SchedulingError::OrganizerNoLongerAvailable { .. }
                    | SchedulingError::SchedulingConflict(_) => AttemptState::Conflict,
                    _ => AttemptState::Failed,
                };
                Err(err)
            }
        }
    }

    /// The background notification task of the committed meeting, if any.
    pub fn take_notifications(&mut self) -> Option<JoinHandle<DispatchReport>> {
        self.notifications.take()
    }
}
