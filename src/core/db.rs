use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

pub const DB_FILE_NAME: &str = "huddle.db";

// How long a writer waits on a lock held by another process (the CLI
// and the server share the same file) before giving up with SQLITE_BUSY
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// Each entry moves the schema forward by one version. Applied
// migrations are tracked with `PRAGMA user_version` so they only ever
// run once per database.
const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS user (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS meeting (
        id TEXT PRIMARY KEY,
        organizer_id TEXT NOT NULL,
        title TEXT NOT NULL,
        reason TEXT NOT NULL,
        date TEXT NOT NULL,
        start_minute INTEGER NOT NULL,
        end_minute INTEGER NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        CHECK (start_minute < end_minute)
    );

    CREATE TABLE IF NOT EXISTS meeting_participant (
        meeting_id TEXT NOT NULL REFERENCES meeting(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL,
        role TEXT NOT NULL,
        PRIMARY KEY (meeting_id, user_id)
    );

    CREATE INDEX IF NOT EXISTS meeting_participant_user_idx
        ON meeting_participant(user_id);
    CREATE INDEX IF NOT EXISTS meeting_date_idx ON meeting(date);
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inbox_message (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        recipient_id TEXT NOT NULL,
        sender_id TEXT NOT NULL,
        body TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS inbox_message_recipient_idx
        ON inbox_message(recipient_id);

    CREATE TABLE IF NOT EXISTS push_subscription (
        endpoint TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        p256dh TEXT NOT NULL,
        auth TEXT NOT NULL
    );
    "#,
];

/// Open the async connection to the database stored in `db_dir`,
/// creating the directory if needed.
pub async fn async_db(db_dir: &str) -> Result<Connection, Error> {
    fs::create_dir_all(db_dir)?;
    let path = Path::new(db_dir).join(DB_FILE_NAME);
    let db = Connection::open(path).await?;
    db.call(|conn| {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

/// Open a throwaway in-memory database with the schema applied.
pub async fn memory_db() -> Result<Connection, Error> {
    let db = Connection::open_in_memory().await?;
    db.call(|conn| {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

pub fn schema_version(conn: &rusqlite::Connection) -> rusqlite::Result<usize> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version as usize)
}

/// Create every table from scratch. Safe to run against an existing
/// database since it only applies migrations that haven't run yet.
pub fn initialize_db(conn: &mut rusqlite::Connection) -> rusqlite::Result<usize> {
    migrate_db(conn)
}

/// Apply pending migrations and return the resulting schema version.
pub fn migrate_db(conn: &mut rusqlite::Connection) -> rusqlite::Result<usize> {
    let current = schema_version(conn)?;
    for (idx, migration) in MIGRATIONS.iter().enumerate().skip(current) {
        let tx = conn.transaction()?;
        tx.execute_batch(migration)?;
        tx.pragma_update(None, "user_version", (idx + 1) as i64)?;
        tx.commit()?;
        tracing::info!("Applied db migration {}", idx + 1);
    }
    schema_version(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() -> Result<()> {
        let db = Connection::open_in_memory().await?;
        let (first, second) = db
            .call(|conn| {
                let first = initialize_db(conn)?;
                let second = migrate_db(conn)?;
                Ok((first, second))
            })
            .await?;

        assert_eq!(first, MIGRATIONS.len());
        assert_eq!(second, MIGRATIONS.len());
        Ok(())
    }

    #[tokio::test]
    async fn test_async_db_creates_directory() -> Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let nested = temp_dir.path().join("nested").join("db");
        let db = async_db(nested.to_str().unwrap()).await?;
        db.call(|conn| {
            initialize_db(conn)?;
            Ok(())
        })
        .await?;

        assert!(nested.join(DB_FILE_NAME).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_async_db_waits_on_locks() -> Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let db = async_db(temp_dir.path().to_str().unwrap()).await?;
        let timeout_ms: i64 = db
            .call(|conn| Ok(conn.query_row("PRAGMA busy_timeout", [], |row| row.get(0))?))
            .await?;

        assert_eq!(timeout_ms, BUSY_TIMEOUT.as_millis() as i64);
        Ok(())
    }
}
