use anyhow::{Error, Result};
use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushMessageBuilder,
};

use super::models::{PushNotificationPayload, PushSubscription};

pub async fn send_push_notification(
    vapid_private_pem_path: &str,
    subscription: &PushSubscription,
    payload: &PushNotificationPayload,
) -> Result<(), Error> {
    let subscription_info = SubscriptionInfo::new(
        subscription.endpoint.clone(),
        subscription.p256dh.clone(),
        subscription.auth.clone(),
    );

    // Read the VAPID signing material from the PEM file
    let file = std::fs::File::open(vapid_private_pem_path)?;
    let sig_builder = VapidSignatureBuilder::from_pem(file, &subscription_info)?.build()?;

    let mut builder = WebPushMessageBuilder::new(&subscription_info);
    let content = serde_json::to_string(payload)?;
    builder.set_payload(ContentEncoding::Aes128Gcm, content.as_bytes());
    builder.set_vapid_signature(sig_builder);
    let message = builder.build()?;

    let client = HyperWebPushClient::new();
    client.send(message).await?;

    Ok(())
}
