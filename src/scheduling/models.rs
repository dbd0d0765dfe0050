use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::interval::{TimeInterval, format_clock};

/// A meeting already on someone's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingMeeting {
    pub id: String,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub title: String,
}

/// One user-initiated scheduling attempt. Never persisted as-is, only
/// the subset of invitees that turn out to be free is sent to the
/// store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub organizer_id: String,
    pub invitee_ids: Vec<String>,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub reason: String,
    pub title: String,
}

pub const DEFAULT_MEETING_TITLE: &str = "Meeting";

impl MeetingRequest {
    pub fn new(
        organizer_id: &str,
        invitee_ids: Vec<String>,
        date: NaiveDate,
        interval: TimeInterval,
        reason: &str,
    ) -> Self {
        Self {
            organizer_id: organizer_id.to_string(),
            invitee_ids,
            date,
            interval,
            reason: reason.to_string(),
            title: DEFAULT_MEETING_TITLE.to_string(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Human readable "on <date> from <start> to <end>" fragment.
    pub fn when(&self) -> String {
        describe_slot(self.date, &self.interval)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    /// Invitees with nothing on their schedule during the interval, in
    /// the order they were requested
    pub available: Vec<String>,
    pub unavailable_ids: Vec<String>,
    pub unavailable_names: Vec<String>,
    pub organizer_blocked: bool,
}

impl AvailabilityResult {
    pub fn blocked() -> Self {
        Self {
            organizer_blocked: true,
            ..Default::default()
        }
    }

    pub fn is_schedulable(&self) -> bool {
        !self.organizer_blocked && !self.available.is_empty()
    }

    pub fn everyone_available(&self) -> bool {
        !self.organizer_blocked && self.unavailable_ids.is_empty() && !self.available.is_empty()
    }

    pub fn status_message(&self) -> String {
        if self.organizer_blocked {
            "You are not available at this time. Please choose a different time slot.".to_string()
        } else if self.available.is_empty() {
            "No invitees are available at this time.".to_string()
        } else if !self.unavailable_names.is_empty() {
            format!(
                "Some invitees are not available: {}. Meeting will only include available participants.",
                self.unavailable_names.join(", ")
            )
        } else {
            "All participants are available!".to_string()
        }
    }
}

/// The store's input for a create: the request narrowed down to the
/// invitees that were confirmed free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMeeting {
    pub organizer_id: String,
    pub invitee_ids: Vec<String>,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedMeeting {
    pub id: String,
    pub organizer_id: String,
    pub invitee_ids: Vec<String>,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub title: String,
    pub reason: String,
}

impl CommittedMeeting {
    pub fn from_new(id: String, meeting: NewMeeting) -> Self {
        let NewMeeting {
            organizer_id,
            invitee_ids,
            date,
            interval,
            title,
            reason,
        } = meeting;
        Self {
            id,
            organizer_id,
            invitee_ids,
            date,
            interval,
            title,
            reason,
        }
    }

    pub fn when(&self) -> String {
        describe_slot(self.date, &self.interval)
    }
}

fn describe_slot(date: NaiveDate, interval: &TimeInterval) -> String {
    format!(
        "{} from {} to {}",
        date.format("%Y-%m-%d"),
        format_clock(interval.start()),
        format_clock(interval.end())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert!(AvailabilityResult::blocked().status_message().starts_with("You are not available"));

        let partial = AvailabilityResult {
            available: vec!["b".to_string()],
            unavailable_ids: vec!["a".to_string()],
            unavailable_names: vec!["Alice".to_string()],
            organizer_blocked: false,
        };
        assert!(partial.is_schedulable());
        assert!(!partial.everyone_available());
        assert!(partial.status_message().contains("Alice"));

        let nobody = AvailabilityResult {
            unavailable_ids: vec!["a".to_string()],
            unavailable_names: vec!["Alice".to_string()],
            ..Default::default()
        };
        assert!(!nobody.is_schedulable());
        assert_eq!(nobody.status_message(), "No invitees are available at this time.");
    }

    #[test]
    fn test_describes_slot() {
        let request = MeetingRequest::new(
            "org",
            vec!["b".to_string()],
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            TimeInterval::parse("09:00", "10:00").unwrap(),
            "Planning",
        );
        assert_eq!(request.when(), "2025-03-14 from 09:00 to 10:00");
        assert_eq!(request.title, DEFAULT_MEETING_TITLE);
    }
}
