use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

mod fcm;
pub use fcm::*;

mod recording;
pub use recording::*;

pub type Result<T> = std::result::Result<T, PushError>;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("push transport failed: {0}")]
    Transport(String),
}

/// The fixed delivery hints applied to every push this system sends.
#[derive(Debug, Clone)]
pub struct DeliveryPolicy {
    pub priority: &'static str,
    pub click_action: &'static str,
    pub channel_id: &'static str,
    pub sound: &'static str,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            priority: "high",
            click_action: "FLUTTER_NOTIFICATION_CLICK",
            channel_id: "matchpoint",
            sound: "default",
        }
    }
}

/// A push message with a caller-supplied title, body, and data payload.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: HashMap::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: &str) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }
}

/// Represents a transport that can multicast one push to a set of device tokens.
///
/// Delivery is best-effort: the system never retries a failed send and never
/// lets one undo a preceding document mutation.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, tokens: &[String], notification: &Notification) -> Result<()>;
}
