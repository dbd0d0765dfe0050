use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PushSubscription {
    pub endpoint: String,
    pub user_id: String,
    pub p256dh: String,
    pub auth: String,
}

/// A direct message delivered to a user's inbox.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct InboxMessage {
    pub id: i64,
    pub recipient_id: String,
    pub sender_id: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Serialize, Clone)]
/// Application specific data the service worker reads from the
/// notification event.
struct PushNotificationData {
    // The URL to open when the notification is clicked
    url: String,
}

#[derive(Serialize, Clone)]
pub struct PushNotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    // Notifications sharing a tag replace each other on the device
    pub tag: Option<String>,
    data: PushNotificationData,
}

impl PushNotificationPayload {
    pub fn new(title: &str, body: &str, url: Option<&str>, tag: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            tag: tag.map(|s| s.to_string()),
            data: PushNotificationData {
                url: url.map(|u| u.to_string()).unwrap_or("/".to_string()),
            },
        }
    }
}

/// Which invitees were told about a meeting and which weren't.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: Vec<String>,
    pub failed: Vec<String>,
}
