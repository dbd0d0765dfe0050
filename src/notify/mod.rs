//! Best-effort delivery of meeting invitations. Nothing in here can
//! undo a meeting that was already stored.

pub mod db;
pub mod models;
mod push;
pub use db::*;
pub use models::*;
pub use push::send_push_notification;

use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tokio_rusqlite::Connection;

use crate::directory::User;

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(&self, recipient: &User, sender: &User, message: &str) -> Result<(), Error>;
}

/// Delivers the message as a direct message in the recipient's inbox.
#[derive(Clone)]
pub struct InboxDispatcher {
    db: Connection,
}

impl InboxDispatcher {
    pub fn new(db: Connection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationDispatcher for InboxDispatcher {
    async fn notify(&self, recipient: &User, sender: &User, message: &str) -> Result<(), Error> {
        insert_inbox_message(&self.db, &recipient.id, &sender.id, message).await?;
        Ok(())
    }
}

/// Sends a web push notification to every device the recipient
/// registered.
#[derive(Clone)]
pub struct PushDispatcher {
    db: Connection,
    vapid_key_path: String,
}

impl PushDispatcher {
    pub fn new(db: Connection, vapid_key_path: &str) -> Self {
        Self {
            db,
            vapid_key_path: vapid_key_path.to_string(),
        }
    }
}

#[async_trait]
impl NotificationDispatcher for PushDispatcher {
    async fn notify(&self, recipient: &User, sender: &User, message: &str) -> Result<(), Error> {
        let subscriptions = find_push_subscriptions_for_user(&self.db, &recipient.id).await?;
        if subscriptions.is_empty() {
            tracing::debug!("No push subscriptions for {}", recipient.id);
            return Ok(());
        }

        let title = format!("Meeting invitation from {}", sender.name);
        let payload = PushNotificationPayload::new(&title, message, None, Some("meeting_invite"));

        let mut failures = 0;
        for subscription in &subscriptions {
            if let Err(err) =
                send_push_notification(&self.vapid_key_path, subscription, &payload).await
            {
                tracing::warn!(
                    "Push to {} for {} failed: {}",
                    subscription.endpoint,
                    recipient.id,
                    err
                );
                failures += 1;
            }
        }

        if failures > 0 {
            return Err(anyhow!(
                "{} of {} push deliveries to {} failed",
                failures,
                subscriptions.len(),
                recipient.id
            ));
        }
        Ok(())
    }
}

/// Hands the same message to several dispatchers. Every dispatcher is
/// tried even when an earlier one fails.
pub struct FanoutDispatcher {
    dispatchers: Vec<Arc<dyn NotificationDispatcher>>,
}

impl FanoutDispatcher {
    pub fn new(dispatchers: Vec<Arc<dyn NotificationDispatcher>>) -> Self {
        Self { dispatchers }
    }
}

#[async_trait]
impl NotificationDispatcher for FanoutDispatcher {
    async fn notify(&self, recipient: &User, sender: &User, message: &str) -> Result<(), Error> {
        let mut errors = Vec::new();
        for dispatcher in &self.dispatchers {
            if let Err(err) = dispatcher.notify(recipient, sender, message).await {
                errors.push(err.to_string());
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow!(errors.join("; ")))
        }
    }
}

/// Inbox delivery always, plus push when a VAPID key is configured.
pub fn default_dispatcher(
    db: &Connection,
    vapid_key_path: Option<&str>,
) -> Arc<dyn NotificationDispatcher> {
    let inbox: Arc<dyn NotificationDispatcher> = Arc::new(InboxDispatcher::new(db.clone()));
    match vapid_key_path {
        Some(path) => Arc::new(FanoutDispatcher::new(vec![
            inbox,
            Arc::new(PushDispatcher::new(db.clone(), path)),
        ])),
        None => inbox,
    }
}

/// Notify each recipient independently. A failed delivery is logged and
/// never stops delivery to anyone else.
pub async fn broadcast_invitation(
    dispatcher: Arc<dyn NotificationDispatcher>,
    sender: User,
    recipients: Vec<User>,
    message: String,
) -> DispatchReport {
    let mut tasks = tokio::task::JoinSet::new();
    for recipient in recipients {
        let dispatcher = Arc::clone(&dispatcher);
        let sender = sender.clone();
        let message = message.clone();
        tasks.spawn(async move {
            let result = dispatcher.notify(&recipient, &sender, &message).await;
            (recipient.id, result)
        });
    }

    let mut report = DispatchReport::default();
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok((recipient_id, Ok(()))) => report.delivered.push(recipient_id),
            Ok((recipient_id, Err(err))) => {
                tracing::error!("Failed to notify {}: {}", recipient_id, err);
                report.failed.push(recipient_id);
            }
            Err(err) => tracing::error!("Notification task failed: {}", err),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::memory_db;

    struct FailFor(&'static str);

    #[async_trait]
    impl NotificationDispatcher for FailFor {
        async fn notify(&self, recipient: &User, _sender: &User, _message: &str) -> Result<()> {
            if recipient.id == self.0 {
                Err(anyhow!("mailbox full"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_others() {
        let sender = User::new("org", "Olivia", "olivia@example.com");
        let recipients = vec![
            User::new("a", "Ann", "ann@example.com"),
            User::new("b", "Ben", "ben@example.com"),
            User::new("c", "Cal", "cal@example.com"),
        ];

        let mut report =
            broadcast_invitation(Arc::new(FailFor("b")), sender, recipients, "hi".to_string())
                .await;
        report.delivered.sort();

        assert_eq!(report.delivered, vec!["a", "c"]);
        assert_eq!(report.failed, vec!["b"]);
    }

    #[tokio::test]
    async fn test_inbox_dispatcher_stores_message() -> Result<()> {
        let db = memory_db().await?;
        let dispatcher = InboxDispatcher::new(db.clone());
        let sender = User::new("org", "Olivia", "olivia@example.com");
        let recipient = User::new("a", "Ann", "ann@example.com");

        dispatcher.notify(&recipient, &sender, "You're invited").await?;

        let inbox = find_inbox_messages(&db, "a").await?;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].sender_id, "org");
        assert_eq!(inbox[0].body, "You're invited");
        Ok(())
    }

    #[tokio::test]
    async fn test_push_dispatcher_without_subscriptions_is_a_no_op() -> Result<()> {
        let db = memory_db().await?;
        let dispatcher = PushDispatcher::new(db, "/does/not/exist.pem");
        let sender = User::new("org", "Olivia", "olivia@example.com");
        let recipient = User::new("a", "Ann", "ann@example.com");

        dispatcher.notify(&recipient, &sender, "You're invited").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_fanout_tries_every_dispatcher() -> Result<()> {
        let db = memory_db().await?;
        let dispatchers: Vec<Arc<dyn NotificationDispatcher>> = vec![
            Arc::new(FailFor("a")),
            Arc::new(InboxDispatcher::new(db.clone())),
        ];
        let fanout = FanoutDispatcher::new(dispatchers);
        let sender = User::new("org", "Olivia", "olivia@example.com");
        let recipient = User::new("a", "Ann", "ann@example.com");

        let result = fanout.notify(&recipient, &sender, "You're invited").await;
        assert!(result.is_err());
        assert_eq!(find_inbox_messages(&db, "a").await?.len(), 1);
        Ok(())
    }
}
