use anyhow::{Context, Error, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{OptionalExtension, TransactionBehavior};
use tokio_rusqlite::{Connection, params};
use uuid::Uuid;

use super::interval::TimeInterval;
use super::models::{CommittedMeeting, ExistingMeeting, NewMeeting};
use super::store::{ScheduleStore, StoreError};

const DATE_FORMAT: &str = "%Y-%m-%d";

enum CreateOutcome {
    Created,
    Conflict { user_id: String, meeting_id: String },
}

/// The authoritative schedule. Every create re-checks all participants
/// inside a write transaction, so two racing creates for the same
/// person can never both succeed.
#[derive(Clone)]
pub struct SqliteScheduleStore {
    db: Connection,
    buffer_minutes: u16,
}

impl SqliteScheduleStore {
    pub fn new(db: Connection) -> Self {
        Self {
            db,
            buffer_minutes: 0,
        }
    }

    /// Keep `minutes` free before and after every existing meeting when
    /// accepting new ones.
    pub fn with_buffer_minutes(mut self, minutes: u16) -> Self {
        self.buffer_minutes = minutes;
        self
    }
}

fn meeting_from_row(
    (id, date, start, end, title): (String, String, u16, u16, String),
) -> Result<ExistingMeeting, Error> {
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .with_context(|| format!("Meeting {} has an invalid date {:?}", id, date))?;
    let interval = TimeInterval::new(start, end)
        .with_context(|| format!("Meeting {} has an invalid interval", id))?;
    Ok(ExistingMeeting {
        id,
        date,
        interval,
        title,
    })
}

pub async fn find_meetings_for_user(
    db: &Connection,
    user_id: &str,
    date: NaiveDate,
) -> Result<Vec<ExistingMeeting>, Error> {
    let user_id = user_id.to_owned();
    let date = date.format(DATE_FORMAT).to_string();
    let rows = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT m.id, m.date, m.start_minute, m.end_minute, m.title
                FROM meeting m
                JOIN meeting_participant p ON p.meeting_id = m.id
                WHERE p.user_id = ?1 AND m.date = ?2
                ORDER BY m.start_minute, m.id
                "#,
            )?;
            let rows = stmt
                .query_map(params![user_id, date], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
                })?
                .collect::<Result<Vec<(String, String, u16, u16, String)>, _>>()?;
            Ok(rows)
        })
        .await?;

    rows.into_iter().map(meeting_from_row).collect()
}

#[async_trait]
impl ScheduleStore for SqliteScheduleStore {
    async fn list_meetings(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ExistingMeeting>, StoreError> {
        Ok(find_meetings_for_user(&self.db, user_id, date).await?)
    }

    async fn create_meeting(&self, meeting: NewMeeting) -> Result<CommittedMeeting, StoreError> {
        let id = Uuid::new_v4().to_string();
        let date = meeting.date.format(DATE_FORMAT).to_string();
        let guarded = meeting.interval.padded(self.buffer_minutes);

        // Organizer first, then invitees, without repeats
        let mut participants: Vec<(String, &'static str)> =
            vec![(meeting.organizer_id.clone(), "organizer")];
        for invitee in &meeting.invitee_ids {
            if !participants.iter().any(|(id, _)| id == invitee) {
                participants.push((invitee.clone(), "invitee"));
            }
        }

        let row_id = id.clone();
        let NewMeeting {
            organizer_id,
            title,
            reason,
            interval,
            ..
        } = meeting.clone();

        let outcome = self
            .db
            .call(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

                for (user_id, _) in &participants {
                    let existing: Option<String> = tx
                        .query_row(
                            r#"
                            SELECT m.id
                            FROM meeting m
                            JOIN meeting_participant p ON p.meeting_id = m.id
                            WHERE p.user_id = ?1
                              AND m.date = ?2
                              AND m.start_minute < ?3
                              AND ?4 < m.end_minute
                            ORDER BY m.start_minute
                            LIMIT 1
                            "#,
                            params![user_id, date, guarded.end(), guarded.start()],
                            |row| row.get(0),
                        )
                        .optional()?;

                    // Dropping the transaction rolls it back
                    if let Some(meeting_id) = existing {
                        return Ok(CreateOutcome::Conflict {
                            user_id: user_id.clone(),
                            meeting_id,
                        });
                    }
                }

                tx.execute(
                    r#"
                    INSERT INTO meeting (id, organizer_id, title, reason, date, start_minute, end_minute)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                    params![
                        row_id,
                        organizer_id,
                        title,
                        reason,
                        date,
                        interval.start(),
                        interval.end()
                    ],
                )?;
                for (user_id, role) in &participants {
                    tx.execute(
                        "INSERT INTO meeting_participant (meeting_id, user_id, role) VALUES (?1, ?2, ?3)",
                        params![row_id, user_id, role],
                    )?;
                }
                tx.commit()?;

                Ok(CreateOutcome::Created)
            })
            .await?;

        match outcome {
            CreateOutcome::Created => {
                tracing::info!(
                    "Stored meeting {} for organizer {} with {} invitee(s)",
                    id,
                    meeting.organizer_id,
                    meeting.invitee_ids.len()
                );
                Ok(CommittedMeeting::from_new(id, meeting))
            }
            CreateOutcome::Conflict {
                user_id,
                meeting_id,
            } => {
                tracing::warn!(
                    "Rejected meeting on {} {}: user {} is booked in meeting {}",
                    meeting.date,
                    meeting.interval,
                    user_id,
                    meeting_id
                );
                Err(StoreError::Conflict {
                    user_id,
                    meeting_id,
                })
            }
        }
    }
}
