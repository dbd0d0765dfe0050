use anyhow::Result;

use crate::core::db::{async_db, migrate_db};
use crate::directory::{create_user, find_all_users};

async fn open_db(db_path: &str) -> Result<tokio_rusqlite::Connection> {
    let db = async_db(db_path).await?;
    db.call(|conn| {
        migrate_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

pub async fn add(db_path: &str, id: Option<&str>, name: &str, email: &str) -> Result<()> {
    let db = open_db(db_path).await?;
    let user = create_user(&db, id, name, email).await?;
    println!("Added {} <{}> with id {}", user.name, user.email, user.id);
    Ok(())
}

pub async fn list(db_path: &str) -> Result<()> {
    let db = open_db(db_path).await?;
    let users = find_all_users(&db).await?;
    if users.is_empty() {
        println!("No users yet. Add one with `huddle user add`.");
    }
    for user in users {
        println!("{}\t{}\t{}", user.id, user.name, user.email);
    }
    Ok(())
}
