use anyhow::{Error, Result};
use tokio_rusqlite::{Connection, params};

use super::models::{InboxMessage, PushSubscription};

pub async fn insert_inbox_message(
    db: &Connection,
    recipient_id: &str,
    sender_id: &str,
    body: &str,
) -> Result<i64, Error> {
    let recipient_id = recipient_id.to_owned();
    let sender_id = sender_id.to_owned();
    let body = body.to_owned();
    let id = db
        .call(move |conn| {
            conn.execute(
                "INSERT INTO inbox_message (recipient_id, sender_id, body) VALUES (?1, ?2, ?3)",
                params![recipient_id, sender_id, body],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await?;
    Ok(id)
}

pub async fn find_inbox_messages(
    db: &Connection,
    recipient_id: &str,
) -> Result<Vec<InboxMessage>, Error> {
    let recipient_id = recipient_id.to_owned();
    let messages = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, recipient_id, sender_id, body, created_at
                FROM inbox_message
                WHERE recipient_id = ?1
                ORDER BY id DESC
                "#,
            )?;
            let rows = stmt
                .query_map([recipient_id], |row| {
                    Ok(InboxMessage {
                        id: row.get(0)?,
                        recipient_id: row.get(1)?,
                        sender_id: row.get(2)?,
                        body: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<InboxMessage>, _>>()?;
            Ok(rows)
        })
        .await?;
    Ok(messages)
}

pub async fn upsert_push_subscription(
    db: &Connection,
    subscription: PushSubscription,
) -> Result<(), Error> {
    db.call(move |conn| {
        conn.execute(
            "REPLACE INTO push_subscription (endpoint, user_id, p256dh, auth) VALUES (?1, ?2, ?3, ?4)",
            params![
                subscription.endpoint,
                subscription.user_id,
                subscription.p256dh,
                subscription.auth,
            ],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn find_push_subscriptions_for_user(
    db: &Connection,
    user_id: &str,
) -> Result<Vec<PushSubscription>, Error> {
    let user_id = user_id.to_owned();
    let subscriptions = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT endpoint, user_id, p256dh, auth FROM push_subscription WHERE user_id = ?1",
            )?;
            let rows = stmt
                .query_map([user_id], |i| {
                    Ok(PushSubscription {
                        endpoint: i.get(0)?,
                        user_id: i.get(1)?,
                        p256dh: i.get(2)?,
                        auth: i.get(3)?,
                    })
                })?
                .collect::<Result<Vec<PushSubscription>, _>>()?;
            Ok(rows)
        })
        .await?;
    Ok(subscriptions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::memory_db;

    #[tokio::test]
    async fn test_inbox_round_trip() -> Result<()> {
        let db = memory_db().await?;
        insert_inbox_message(&db, "bob", "alice", "first").await?;
        insert_inbox_message(&db, "bob", "alice", "second").await?;
        insert_inbox_message(&db, "carol", "alice", "other").await?;

        let inbox = find_inbox_messages(&db, "bob").await?;
        let bodies: Vec<&str> = inbox.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["second", "first"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_resubscribing_replaces_endpoint() -> Result<()> {
        let db = memory_db().await?;
        let subscription = PushSubscription {
            endpoint: "https://push.example.com/1".to_string(),
            user_id: "bob".to_string(),
            p256dh: "key".to_string(),
            auth: "auth".to_string(),
        };
        upsert_push_subscription(&db, subscription.clone()).await?;
        upsert_push_subscription(
            &db,
            PushSubscription {
                user_id: "carol".to_string(),
                ..subscription
            },
        )
        .await?;

        assert!(find_push_subscriptions_for_user(&db, "bob").await?.is_empty());
        assert_eq!(find_push_subscriptions_for_user(&db, "carol").await?.len(), 1);
        Ok(())
    }
}
