//! Read-only roster of users. Only used to resolve display names and
//! notification addresses, never for conflict detection.

pub mod db;
mod error;
pub mod models;
pub use db::*;
pub use error::DirectoryError;
pub use models::*;

use anyhow::{Error, Result};
use async_trait::async_trait;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn lookup(&self, id: &str) -> Result<Option<User>, Error>;

    async fn list(&self) -> Result<Vec<User>, Error>;
}
