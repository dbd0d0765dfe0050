use crate::core::db::{async_db, initialize_db};
use anyhow::{Result, anyhow};

pub async fn run(db: bool, db_path: &str) -> Result<()> {
    if !db {
        return Err(anyhow!("Missing value for init \"--db\""));
    }

    println!("Initializing db...");
    let db = async_db(db_path).await?;
    let version = db
        .call(|conn| {
            let version = initialize_db(conn)?;
            Ok(version)
        })
        .await?;
    println!("Finished initializing db at schema version {}", version);

    Ok(())
}
