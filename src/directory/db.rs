use anyhow::{Error, Result};
use async_trait::async_trait;
use rusqlite::{ErrorCode, OptionalExtension};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::{DirectoryError, User, UserDirectory};

/// Add a user to the roster. Ids and emails are unique, registering
/// either twice is a `Duplicate` error.
pub async fn create_user(
    db: &Connection,
    id: Option<&str>,
    name: &str,
    email: &str,
) -> Result<User, DirectoryError> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() {
        return Err(DirectoryError::Invalid {
            field: "name",
            reason: "is required",
        });
    }
    if email.is_empty() {
        return Err(DirectoryError::Invalid {
            field: "email",
            reason: "is required",
        });
    }
    if id.is_some_and(|id| id.trim().is_empty()) {
        return Err(DirectoryError::Invalid {
            field: "id",
            reason: "can't be blank",
        });
    }

    let user = User::new(
        &id.map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        name,
        email,
    );
    let row = user.clone();
    let inserted = db
        .call(move |conn| {
            conn.execute(
                "INSERT INTO user (id, name, email) VALUES (?1, ?2, ?3)",
                tokio_rusqlite::params![row.id, row.name, row.email],
            )?;
            Ok(())
        })
        .await;

    match inserted {
        Ok(()) => Ok(user),
        Err(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(err, message)))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            let field = match message.as_deref() {
                Some(message) if message.contains("user.email") => "email",
                _ => "id",
            };
            Err(DirectoryError::Duplicate { field })
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn find_user_by_id(db: &Connection, id: &str) -> Result<Option<User>, Error> {
    let id = id.to_owned();
    let user = db
        .call(move |conn| {
            let user = conn
                .query_row(
                    "SELECT id, name, email FROM user WHERE id = ?1",
                    [&id],
                    |row| {
                        Ok(User {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            email: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(user)
        })
        .await?;
    Ok(user)
}

pub async fn find_all_users(db: &Connection) -> Result<Vec<User>, Error> {
    let users = db
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, email FROM user ORDER BY name, id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(User {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<User>, _>>()?;
            Ok(rows)
        })
        .await?;
    Ok(users)
}

/// User directory backed by the `user` table.
#[derive(Clone)]
pub struct SqliteUserDirectory {
    db: Connection,
}

impl SqliteUserDirectory {
    pub fn new(db: Connection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    async fn lookup(&self, id: &str) -> Result<Option<User>, Error> {
        find_user_by_id(&self.db, id).await
    }

    async fn list(&self) -> Result<Vec<User>, Error> {
        find_all_users(&self.db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::memory_db;

    #[tokio::test]
    async fn test_create_and_lookup_user() -> Result<()> {
        let db = memory_db().await?;
        let created = create_user(&db, Some("u-1"), "Ada", "ada@example.com").await?;
        assert_eq!(created.id, "u-1");

        let directory = SqliteUserDirectory::new(db);
        let found = directory.lookup("u-1").await?;
        assert_eq!(found, Some(created));
        assert_eq!(directory.lookup("missing").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_generates_id() -> Result<()> {
        let db = memory_db().await?;
        let created = create_user(&db, None, "Grace", "grace@example.com").await?;
        assert!(!created.id.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_requires_name() -> Result<()> {
        let db = memory_db().await?;
        let result = create_user(&db, None, "  ", "nobody@example.com").await;
        assert!(result.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicates() -> Result<()> {
        let db = memory_db().await?;
        create_user(&db, Some("u-1"), "Ada", "ada@example.com").await?;

        let same_id = create_user(&db, Some("u-1"), "Other", "other@example.com").await;
        assert!(matches!(same_id, Err(DirectoryError::Duplicate { field: "id" })));

        let same_email = create_user(&db, Some("u-2"), "Ada Again", "ada@example.com").await;
        assert!(matches!(
            same_email,
            Err(DirectoryError::Duplicate { field: "email" })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_users_sorted_by_name() -> Result<()> {
        let db = memory_db().await?;
        create_user(&db, Some("2"), "Zed", "zed@example.com").await?;
        create_user(&db, Some("1"), "Amy", "amy@example.com").await?;

        let names: Vec<String> = SqliteUserDirectory::new(db)
            .list()
            .await?
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Amy", "Zed"]);

        Ok(())
    }
}
