use std::sync::Arc;

use log::{error, info};

use crate::{
    push::{Notification, PushSender},
    store::DocumentStore,
};

/// What happened to one notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The multicast send went through.
    Sent,
    /// The target has no registered device tokens. Not an error.
    NoToken,
    /// The transport rejected the send. Logged, never propagated.
    Failed,
}

/// Resolves a target's device tokens and sends one best-effort push.
///
/// Shared by every trigger: a dispatch never fails the operation that
/// preceded it, whatever the transport does.
pub struct NotificationDispatcher<S, P> {
    store: Arc<S>,
    sender: Arc<P>,
}

impl<S, P> NotificationDispatcher<S, P>
where
    S: DocumentStore,
    P: PushSender,
{
    pub fn new(store: &Arc<S>, sender: &Arc<P>) -> Self {
        Self {
            store: store.clone(),
            sender: sender.clone(),
        }
    }

    /// Sends `notification` to every device registered for `uid`.
    pub async fn notify(&self, uid: &str, notification: Notification) -> DispatchOutcome {
        let user = match self.store.user_by_id(uid).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                info!("no profile for {uid}, skipping notification");
                return DispatchOutcome::NoToken;
            }
            Err(e) => {
                error!("could not resolve tokens for {uid}: {e}");
                return DispatchOutcome::Failed;
            }
        };

        let tokens: Vec<_> = user.device_tokens.values().cloned().collect();

        if tokens.is_empty() {
            info!("{uid} has no device tokens, skipping notification");
            return DispatchOutcome::NoToken;
        }

        match self.sender.send(&tokens, &notification).await {
            Ok(()) => {
                info!("sent \"{}\" to {uid}", notification.title);
                DispatchOutcome::Sent
            }
            Err(e) => {
                error!("could not send \"{}\" to {uid}: {e}", notification.title);
                DispatchOutcome::Failed
            }
        }
    }
}
