use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{DeliveryPolicy, Notification, PushError, PushSender, Result};

/// A push sender speaking the FCM-style multicast JSON protocol.
pub struct FcmSender {
    client: Client,
    endpoint: String,
    server_key: String,
    policy: DeliveryPolicy,
}

impl FcmSender {
    pub fn new(endpoint: &str, server_key: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            server_key: server_key.to_string(),
            policy: DeliveryPolicy::default(),
        }
    }
}

#[async_trait]
impl PushSender for FcmSender {
    async fn send(&self, tokens: &[String], notification: &Notification) -> Result<()> {
        let payload = json!({
            "registration_ids": tokens,
            "priority": self.policy.priority,
            "notification": {
                "title": notification.title,
                "body": notification.body,
                "sound": self.policy.sound,
                "click_action": self.policy.click_action,
                "android_channel_id": self.policy.channel_id,
            },
            "data": notification.data,
        });

        self.client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| PushError::Transport(e.to_string()))?;

        Ok(())
    }
}
