use crate::core::db::{async_db, migrate_db, schema_version};
use anyhow::{Result, anyhow};

pub async fn run(db: bool, db_path: &str) -> Result<()> {
    if !db {
        return Err(anyhow!("Missing value for migrate \"--db\""));
    }

    // Run the DB migration script
    println!("Migrating db...");
    let db = async_db(db_path).await?;
    let (before, after) = db
        .call(|conn| {
            let before = schema_version(conn)?;
            let after = migrate_db(conn)?;
            Ok((before, after))
        })
        .await?;
    println!("Finished migrating db from version {} to {}", before, after);

    Ok(())
}
