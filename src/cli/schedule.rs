use std::sync::Arc;

use anyhow::{Result, anyhow};

use crate::core::AppConfig;
use crate::core::db::{async_db, migrate_db};
use crate::directory::{SqliteUserDirectory, User, UserDirectory};
use crate::notify::default_dispatcher;
use crate::scheduling::{
    Recovery, ScheduleStore, SchedulingAttempt, SchedulingCommitter,
    SqliteScheduleStore, parse_slot,
};

pub struct ScheduleArgs {
    pub organizer: String,
    pub invitees: Vec<String>,
    pub date: String,
    pub start: String,
    pub end: String,
    pub reason: String,
    pub title: String,
    pub confirm: bool,
}

async fn find_user(directory: &dyn UserDirectory, id: &str) -> Result<User> {
    directory
        .lookup(id)
        .await?
        .ok_or_else(|| anyhow!("No user with id {}", id))
}

fn recovery_hint(recovery: Recovery) -> &'static str {
    match recovery {
        Recovery::FixInput => "Fix the request and try again.",
        Recovery::RetryAsIs => "This may be temporary, try again.",
        Recovery::RestartFromCheck => "Schedules changed, check availability again.",
    }
}

pub async fn run(args: ScheduleArgs, config: AppConfig) -> Result<()> {
    crate::cli::init_tracing(&format!("{}=info", env!("CARGO_CRATE_NAME")));

    let db = async_db(&config.db_path).await?;
    db.call(|conn| {
        migrate_db(conn)?;
        Ok(())
    })
    .await?;

    let store: Arc<dyn ScheduleStore> = Arc::new(
        SqliteScheduleStore::new(db.clone()).with_buffer_minutes(config.conflict_buffer_minutes),
    );
    let directory: Arc<dyn UserDirectory> = Arc::new(SqliteUserDirectory::new(db.clone()));
    let dispatcher = default_dispatcher(&db, config.vapid_key_path.as_deref());
    let committer =
        SchedulingCommitter::new(Arc::clone(&store), Arc::clone(&directory), dispatcher);

    let organizer = find_user(directory.as_ref(), &args.organizer).await?;
    let mut invitees = Vec::with_capacity(args.invitees.len());
    for id in &args.invitees {
        invitees.push(find_user(directory.as_ref(), id).await?);
    }
    let (date, interval) = parse_slot(Some(&args.date), Some(&args.start), Some(&args.end))?;

    let mut attempt = SchedulingAttempt::new(store, committer);
    let result = match attempt
        .check(&organizer, &invitees, date, interval, &args.reason, &args.title)
        .await
    {
        Ok(result) => result,
        Err(err) => {
            println!("{}", err);
            println!("{}", recovery_hint(err.recovery()));
            return Err(err.into());
        }
    };

    println!("{}", result.status_message());
    for id in &result.available {
        println!("  available: {}", id);
    }
    for name in &result.unavailable_names {
        println!("  busy: {}", name);
    }

    if !args.confirm || !result.is_schedulable() {
        return Ok(());
    }

    match attempt.commit().await {
        Ok(meeting) => {
            println!(
                "Meeting {} scheduled on {} with {} invitee(s)",
                meeting.id,
                meeting.when(),
                meeting.invitee_ids.len()
            );
        }
        Err(err) => {
            println!("{} ({})", err, attempt.state().name());
            println!("{}", recovery_hint(err.recovery()));
            return Err(err.into());
        }
    }

    // The process exits right after this, so wait for delivery
    if let Some(notifications) = attempt.take_notifications() {
        let report = notifications.await?;
        println!(
            "Notified {} invitee(s), {} failed",
            report.delivered.len(),
            report.failed.len()
        );
    }
    Ok(())
}
