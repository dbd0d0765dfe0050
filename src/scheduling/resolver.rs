//! Works out who is free for a proposed meeting slot.

use chrono::NaiveDate;
use futures::future::try_join_all;

use super::error::SchedulingError;
use super::interval::{TimeInterval, overlaps};
use super::models::{AvailabilityResult, ExistingMeeting};
use super::store::ScheduleStore;
use crate::directory::User;

/// Parse the raw date and clock fields of a scheduling form. Each
/// missing or malformed field is reported by name.
pub fn parse_slot(
    date: Option<&str>,
    start_time: Option<&str>,
    end_time: Option<&str>,
) -> Result<(NaiveDate, TimeInterval), SchedulingError> {
    let date = required("date", date)?;
    let start_time = required("start_time", start_time)?;
    let end_time = required("end_time", end_time)?;

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| SchedulingError::validation("date", "expected YYYY-MM-DD"))?;
    let interval = TimeInterval::parse(start_time, end_time)?;
    Ok((date, interval))
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, SchedulingError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(SchedulingError::validation(field, "is required")),
    }
}

/// First meeting that overlaps `interval`, if any.
pub fn find_conflict<'a>(
    meetings: &'a [ExistingMeeting],
    interval: &TimeInterval,
) -> Option<&'a ExistingMeeting> {
    meetings.iter().find(|m| overlaps(interval, &m.interval))
}

async fn load_meetings(
    store: &dyn ScheduleStore,
    user_id: &str,
    date: NaiveDate,
) -> Result<Vec<ExistingMeeting>, SchedulingError> {
    store
        .list_meetings(user_id, date)
        .await
        .map_err(|err| SchedulingError::LookupFailure {
            user_id: user_id.to_string(),
            source: err.into(),
        })
}

/// Check the organizer and every invitee against the store.
///
/// The organizer is checked first: if they are busy the result is
/// `organizer_blocked` and no invitee is looked up. Otherwise invitees
/// are looked up concurrently and split into available and
/// unavailable. Busy invitees are a normal outcome, not an error. Any
/// failed lookup fails the whole check so an unknown schedule is never
/// reported as free.
pub async fn check_availability(
    store: &dyn ScheduleStore,
    organizer: &User,
    invitees: &[User],
    date: NaiveDate,
    interval: TimeInterval,
    reason: &str,
) -> Result<AvailabilityResult, SchedulingError> {
    if reason.trim().is_empty() {
        return Err(SchedulingError::validation("reason", "is required"));
    }

    // Keep the first occurrence of each invitee so the result
    // partitions the input exactly once
    let mut unique: Vec<&User> = Vec::with_capacity(invitees.len());
    for invitee in invitees {
        if invitee.id == organizer.id {
            return Err(SchedulingError::validation(
                "invitees",
                "the organizer can't be invited to their own meeting",
            ));
        }
        if !unique.iter().any(|u| u.id == invitee.id) {
            unique.push(invitee);
        }
    }
    if unique.is_empty() {
        return Err(SchedulingError::validation(
            "invitees",
            "select at least one person",
        ));
    }

    let organizer_meetings = load_meetings(store, &organizer.id, date).await?;
    if let Some(conflict) = find_conflict(&organizer_meetings, &interval) {
        tracing::info!(
            "Organizer {} is busy on {} {}: conflicts with {} ({})",
            organizer.id,
            date,
            interval,
            conflict.id,
            conflict.interval
        );
        return Ok(AvailabilityResult::blocked());
    }

    let schedules = try_join_all(
        unique
            .iter()
            .map(|invitee| load_meetings(store, &invitee.id, date)),
    )
    .await?;

    let mut result = AvailabilityResult::default();
    for (invitee, meetings) in unique.into_iter().zip(schedules) {
        match find_conflict(&meetings, &interval) {
            Some(conflict) => {
                tracing::debug!(
                    "Invitee {} is busy during {}: conflicts with {} ({})",
                    invitee.id,
                    interval,
                    conflict.id,
                    conflict.interval
                );
                result.unavailable_ids.push(invitee.id.clone());
                result.unavailable_names.push(invitee.name.clone());
            }
            None => {
                tracing::debug!("Invitee {} is free during {}", invitee.id, interval);
                result.available.push(invitee.id.clone());
            }
        }
    }

    tracing::info!(
        "Checked availability for {} on {} {}: {} available, {} unavailable",
        organizer.id,
        date,
        interval,
        result.available.len(),
        result.unavailable_ids.len()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slot_names_missing_field() {
        let err = parse_slot(None, Some("09:00"), Some("10:00")).unwrap_err();
        assert!(matches!(err, SchedulingError::Validation { field: "date", .. }));

        let err = parse_slot(Some("2025-06-02"), Some(" "), Some("10:00")).unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Validation {
                field: "start_time",
                ..
            }
        ));

        let err = parse_slot(Some("2025-06-02"), Some("09:00"), None).unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Validation {
                field: "end_time",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_slot_rejects_bad_date() {
        let err = parse_slot(Some("06/02/2025"), Some("09:00"), Some("10:00")).unwrap_err();
        assert!(matches!(err, SchedulingError::Validation { field: "date", .. }));
    }

    #[test]
    fn test_parse_slot() {
        let (date, interval) = parse_slot(Some("2025-06-02"), Some("09:00"), Some("10:00")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(interval.start(), 540);
        assert_eq!(interval.end(), 600);
    }

    #[test]
    fn test_find_conflict_returns_first_overlap() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let meetings = vec![
            ExistingMeeting {
                id: "early".to_string(),
                date,
                interval: TimeInterval::parse("08:00", "09:00").unwrap(),
                title: "Standup".to_string(),
            },
            ExistingMeeting {
                id: "late".to_string(),
                date,
                interval: TimeInterval::parse("09:30", "09:45").unwrap(),
                title: "1:1".to_string(),
            },
        ];

        let slot = TimeInterval::parse("09:00", "10:00").unwrap();
        assert_eq!(find_conflict(&meetings, &slot).map(|m| m.id.as_str()), Some("late"));

        let free = TimeInterval::parse("10:00", "11:00").unwrap();
        assert!(find_conflict(&meetings, &free).is_none());
    }
}
