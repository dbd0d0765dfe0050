use serde::Serialize;

/// What a caller should do after a failed scheduling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// The request itself is wrong and must change before trying again
    FixInput,
    /// Transient failure, the same call can be repeated
    RetryAsIs,
    /// Someone's schedule changed, start over with a fresh availability check
    RestartFromCheck,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("Invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    #[error("Could not load the schedule for user {user_id}: {source}")]
    LookupFailure {
        user_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Organizer is no longer available: conflicts with meeting {meeting_id}")]
    OrganizerNoLongerAvailable { meeting_id: String },

    #[error("Scheduling conflict: {0}")]
    SchedulingConflict(String),

    #[error("Failed to save the meeting: {0}")]
    CommitFailed(#[source] anyhow::Error),

    #[error("Nothing to schedule: {0}")]
    NothingToSchedule(&'static str),
}

impl SchedulingError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Validation { .. } | Self::NothingToSchedule(_) => Recovery::FixInput,
            Self::LookupFailure { .. } | Self::CommitFailed(_) => Recovery::RetryAsIs,
            Self::OrganizerNoLongerAvailable { .. } | Self::SchedulingConflict(_) => {
                Recovery::RestartFromCheck
            }
        }
    }

    /// Stable machine readable name for the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::LookupFailure { .. } => "lookup_failure",
            Self::OrganizerNoLongerAvailable { .. } => "organizer_no_longer_available",
            Self::SchedulingConflict(_) => "scheduling_conflict",
            Self::CommitFailed(_) => "commit_failed",
            Self::NothingToSchedule(_) => "nothing_to_schedule",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_classes() {
        assert_eq!(
            SchedulingError::validation("reason", "is required").recovery(),
            Recovery::FixInput
        );
        assert_eq!(
            SchedulingError::NothingToSchedule("no available invitees").recovery(),
            Recovery::FixInput
        );
        assert_eq!(
            SchedulingError::LookupFailure {
                user_id: "u1".to_string(),
                source: anyhow::anyhow!("timeout"),
            }
            .recovery(),
            Recovery::RetryAsIs
        );
        assert_eq!(
            SchedulingError::CommitFailed(anyhow::anyhow!("disk full")).recovery(),
            Recovery::RetryAsIs
        );
        assert_eq!(
            SchedulingError::OrganizerNoLongerAvailable {
                meeting_id: "m1".to_string()
            }
            .recovery(),
            Recovery::RestartFromCheck
        );
        assert_eq!(
            SchedulingError::SchedulingConflict("taken".to_string()).recovery(),
            Recovery::RestartFromCheck
        );
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = SchedulingError::validation("invitees", "select at least one person");
        assert_eq!(err.to_string(), "Invalid invitees: select at least one person");
        assert_eq!(err.kind(), "validation_error");
    }
}
