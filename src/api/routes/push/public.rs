//! Public types for the push API
use std::collections::HashMap;

use serde::Deserialize;

#[derive(Deserialize)]
pub struct PushSubscriptionRequest {
    pub user_id: String,
    pub endpoint: String,
    pub keys: HashMap<String, String>,
}
