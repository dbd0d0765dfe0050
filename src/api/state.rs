use std::sync::Arc;

use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::directory::{SqliteUserDirectory, UserDirectory};
use crate::notify::{NotificationDispatcher, default_dispatcher};
use crate::scheduling::{ScheduleStore, SchedulingCommitter, SqliteScheduleStore};

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub store: Arc<dyn ScheduleStore>,
    pub directory: Arc<dyn UserDirectory>,
    pub committer: SchedulingCommitter,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        let store: Arc<dyn ScheduleStore> = Arc::new(
            SqliteScheduleStore::new(db.clone())
                .with_buffer_minutes(config.conflict_buffer_minutes),
        );
        let directory: Arc<dyn UserDirectory> = Arc::new(SqliteUserDirectory::new(db.clone()));
        let dispatcher = default_dispatcher(&db, config.vapid_key_path.as_deref());
        Self::with_services(db, config, store, directory, dispatcher)
    }

    /// Wire the state from explicit collaborators instead of the
    /// database backed defaults.
    pub fn with_services(
        db: Connection,
        config: AppConfig,
        store: Arc<dyn ScheduleStore>,
        directory: Arc<dyn UserDirectory>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let committer =
            SchedulingCommitter::new(Arc::clone(&store), Arc::clone(&directory), dispatcher);
        Self {
            db,
            config,
            store,
            directory,
            committer,
        }
    }
}
