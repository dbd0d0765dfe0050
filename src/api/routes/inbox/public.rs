//! Public types for the inbox API
pub use crate::notify::InboxMessage;
