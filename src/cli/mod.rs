use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod init;
pub mod migrate;
pub mod schedule;
pub mod serve;
pub mod user;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum UserCommand {
    /// Add someone to the roster
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Use a fixed id instead of a generated one
        #[arg(long)]
        id: Option<String>,
    },
    /// List everyone in the roster
    List {},
}

#[derive(Subcommand)]
enum Command {
    /// Initialize the database
    Init {
        #[arg(long, action, default_value = "false")]
        db: bool,
    },
    /// Migrate the db schema
    Migrate {
        #[arg(long, action, default_value = "false")]
        db: bool,
    },
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Manage the user roster
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Check who is free for a meeting and optionally book it
    Schedule {
        /// Id of the user organizing the meeting
        #[arg(long)]
        organizer: String,
        /// Ids of the people to invite
        #[arg(long = "invitee", required = true)]
        invitees: Vec<String>,
        /// Date of the meeting, YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Start time, HH:MM
        #[arg(long)]
        start: String,
        /// End time, HH:MM
        #[arg(long)]
        end: String,
        #[arg(long)]
        reason: String,
        #[arg(long, default_value = "Meeting")]
        title: String,
        /// Book the meeting with the available invitees after the check
        #[arg(long, action, default_value = "false")]
        confirm: bool,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// Install the global tracing subscriber, honoring `RUST_LOG` when set.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Init { db }) => {
            init::run(db, &config.db_path).await?;
        }
        Some(Command::Migrate { db }) => {
            migrate::run(db, &config.db_path).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::User { command }) => match command {
            UserCommand::Add { name, email, id } => {
                user::add(&config.db_path, id.as_deref(), &name, &email).await?;
            }
            UserCommand::List {} => {
                user::list(&config.db_path).await?;
            }
        },
        Some(Command::Schedule {
            organizer,
            invitees,
            date,
            start,
            end,
            reason,
            title,
            confirm,
        }) => {
            let args = schedule::ScheduleArgs {
                organizer,
                invitees,
                date,
                start,
                end,
                reason,
                title,
                confirm,
            };
            schedule::run(args, config).await?;
        }
        None => {}
    }

    Ok(())
}
