//! Availability resolution and the check-then-commit scheduling
//! protocol.

pub mod attempt;
pub mod committer;
pub mod db;
pub mod error;
pub mod interval;
pub mod models;
pub mod resolver;
pub mod store;

pub use attempt::{AttemptState, SchedulingAttempt};
pub use committer::{SchedulingCommitter, invitation_message};
pub use db::SqliteScheduleStore;
pub use error::{Recovery, SchedulingError};
pub use interval::{TimeInterval, overlaps};
pub use models::*;
pub use resolver::{check_availability, find_conflict, parse_slot};
pub use store::{ScheduleStore, StoreError};
