//! Wall-clock intervals within a single calendar date

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::SchedulingError;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A half-open `[start, end)` range of minutes since midnight.
///
/// Construction guarantees `start < end`, so every value in circulation
/// is a non-empty interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ClockRange", into = "ClockRange")]
pub struct TimeInterval {
    start: u16,
    end: u16,
}

impl TimeInterval {
    pub fn new(start: u16, end: u16) -> Result<Self, SchedulingError> {
        if end > MINUTES_PER_DAY {
            return Err(SchedulingError::validation(
                "end_time",
                "must not be later than 24:00",
            ));
        }
        if start >= end {
            return Err(SchedulingError::validation(
                "end_time",
                "must be later than start_time",
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse a `HH:MM` start and end pair.
    pub fn parse(start: &str, end: &str) -> Result<Self, SchedulingError> {
        let start = parse_clock(start)
            .ok_or_else(|| SchedulingError::validation("start_time", "expected HH:MM"))?;
        let end = parse_clock(end)
            .ok_or_else(|| SchedulingError::validation("end_time", "expected HH:MM"))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Grow the interval by `minutes` on both sides, clamped to the day.
    pub fn padded(&self, minutes: u16) -> Self {
        Self {
            start: self.start.saturating_sub(minutes),
            end: self.end.saturating_add(minutes).min(MINUTES_PER_DAY),
        }
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_clock(self.start), format_clock(self.end))
    }
}

/// True when the two intervals share at least one minute. A meeting
/// ending at 10:00 does not overlap one starting at 10:00.
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.start < b.end && b.start < a.end
}

/// Parse `HH:MM` into minutes since midnight. `24:00` is accepted so an
/// interval can run to the end of the day.
pub fn parse_clock(value: &str) -> Option<u16> {
    let (hours, minutes) = value.trim().split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let hours: u16 = hours.parse().ok()?;
    let minutes: u16 = minutes.parse().ok()?;
    match (hours, minutes) {
        (24, 0) => Some(MINUTES_PER_DAY),
        (0..=23, 0..=59) => Some(hours * 60 + minutes),
        _ => None,
    }
}

pub fn format_clock(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[derive(Serialize, Deserialize)]
struct ClockRange {
    start: String,
    end: String,
}

impl TryFrom<ClockRange> for TimeInterval {
    type Error = SchedulingError;

    fn try_from(value: ClockRange) -> Result<Self, Self::Error> {
        TimeInterval::parse(&value.start, &value.end)
    }
}

impl From<TimeInterval> for ClockRange {
    fn from(value: TimeInterval) -> Self {
        Self {
            start: format_clock(value.start),
            end: format_clock(value.end),
        }
    }
}
