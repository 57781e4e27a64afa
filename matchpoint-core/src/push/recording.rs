use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Notification, PushError, PushSender, Result};

/// A push sender that records every attempt instead of delivering anything.
/// Used by tests and as a no-op sender for local development.
#[derive(Debug, Default)]
pub struct RecordingSender {
    attempts: Mutex<Vec<(Vec<String>, Notification)>>,
    failing: AtomicBool,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following send fail, to exercise the best-effort paths
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> Vec<(Vec<String>, Notification)> {
        self.attempts.lock().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().len()
    }
}

#[async_trait]
impl PushSender for RecordingSender {
    async fn send(&self, tokens: &[String], notification: &Notification) -> Result<()> {
        self.attempts
            .lock()
            .push((tokens.to_vec(), notification.clone()));

        if self.failing.load(Ordering::SeqCst) {
            return Err(PushError::Transport("recording sender is failing".into()));
        }

        Ok(())
    }
}
