use std::sync::Arc;

use log::{error, info, warn};

use crate::{
    diff::added_ids,
    dispatch::NotificationDispatcher,
    push::{Notification, PushSender},
    store::{DocumentStore, StoreError, Uid, Versioned},
};

/// How often a versioned invitations write is retried after losing to a
/// concurrent writer.
const CONFLICT_RETRY_CAP: usize = 3;

/// The terminal result of propagating one friends list addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationOutcome {
    /// The invitation was created and the peer was notified.
    Applied,
    /// The peer already has the owner in their friends list, nothing to invite.
    AlreadyFriends,
    /// The invitation already exists. Redelivered events end up here.
    AlreadyInvited,
    /// The peer has no friends document.
    PeerMissing,
    /// The peer has no invitations document.
    InvitationsMissing,
    /// A remote read or write failed. Logged, no compensation.
    Failed,
}

/// Converts detected friends list additions into invitations on the added
/// peers' documents, exactly once per pair, and notifies each invited peer.
pub struct InvitationPropagator<S, P> {
    store: Arc<S>,
    dispatcher: NotificationDispatcher<S, P>,
}

impl<S, P> InvitationPropagator<S, P>
where
    S: DocumentStore,
    P: PushSender,
{
    pub fn new(store: &Arc<S>, sender: &Arc<P>) -> Self {
        Self {
            store: store.clone(),
            dispatcher: NotificationDispatcher::new(store, sender),
        }
    }

    /// Handles an update of `owner`'s friends list, propagating every peer
    /// that appears in `after` but not in `before`.
    pub async fn on_friends_update(
        &self,
        owner: &str,
        before: &[Uid],
        after: &[Uid],
    ) -> Vec<(Uid, PropagationOutcome)> {
        let added = added_ids(before, after);

        if added.is_empty() {
            info!("friends/{owner} update added nothing, skipping");
            return vec![];
        }

        let mut outcomes = Vec::with_capacity(added.len());

        for peer in added {
            let outcome = self.propagate(owner, &peer).await;
            outcomes.push((peer, outcome));
        }

        outcomes
    }

    /// Propagates a single (owner, peer) addition. Every failure terminates
    /// just this pair and is reported as an outcome, never as a panic or a
    /// process-level error.
    pub async fn propagate(&self, owner: &str, peer: &str) -> PropagationOutcome {
        match self.apply(owner, peer).await {
            Ok(PropagationOutcome::Applied) => {
                info!("friend added for {owner}, invitation added for {peer}");
                self.notify_peer(owner, peer).await;

                PropagationOutcome::Applied
            }
            Ok(outcome) => outcome,
            Err(e) => {
                error!("could not propagate invitation from {owner} to {peer}: {e}");
                PropagationOutcome::Failed
            }
        }
    }

    /// The guarded steps, each short-circuiting to a terminal outcome.
    async fn apply(&self, owner: &str, peer: &str) -> Result<PropagationOutcome, StoreError> {
        let peer_friends = match self.store.friends_by_id(peer).await {
            Ok(friends) => friends,
            Err(e) if e.is_not_found() => {
                info!("friends/{peer} doesn't exist, nothing to invite");
                return Ok(PropagationOutcome::PeerMissing);
            }
            Err(e) => return Err(e),
        };

        if peer_friends.contains(owner) {
            info!("{peer} already has {owner} as a friend, skipping invitation");
            return Ok(PropagationOutcome::AlreadyFriends);
        }

        for _ in 0..CONFLICT_RETRY_CAP {
            let Versioned { mut doc, revision } = match self.store.invitations_by_id(peer).await {
                Ok(versioned) => versioned,
                Err(e) if e.is_not_found() => {
                    info!("invitations/{peer} doesn't exist, nothing to update");
                    return Ok(PropagationOutcome::InvitationsMissing);
                }
                Err(e) => return Err(e),
            };

            // Idempotency guard: redelivery of the same event must not
            // duplicate the entry
            if !doc.insert(owner) {
                info!("invitations/{peer} already contains {owner}, skipping");
                return Ok(PropagationOutcome::AlreadyInvited);
            }

            match self.store.update_invitations(peer, &doc, &revision).await {
                Ok(()) => return Ok(PropagationOutcome::Applied),
                Err(e) if e.is_conflict() => {
                    warn!("invitations/{peer} changed under us, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(StoreError::Conflict {
            collection: "invitations",
            id: peer.to_string(),
        })
    }

    /// Best-effort "new invitation" push. Dispatch outcomes are logged by the
    /// dispatcher and never fail the propagation.
    async fn notify_peer(&self, owner: &str, peer: &str) {
        let owner_name = self
            .store
            .user_by_id(owner)
            .await
            .map(|u| u.display_name)
            .unwrap_or_else(|_| owner.to_string());

        let notification =
            Notification::new("New friend invitation", format!("{owner_name} added you"))
                .with_data("inviter", owner);

        self.dispatcher.notify(peer, notification).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        push::RecordingSender,
        store::{FriendsList, InvitationsList, MemoryStore, UserRecord},
    };

    fn uids(raw: &[&str]) -> Vec<Uid> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn user(uid: &str) -> UserRecord {
        UserRecord {
            uid: uid.to_string(),
            display_name: format!("{uid} display"),
            nickname: uid.to_string(),
            device_tokens: [("android".to_string(), format!("tok-{uid}"))]
                .into_iter()
                .collect(),
        }
    }

    fn propagator() -> (
        Arc<MemoryStore>,
        Arc<RecordingSender>,
        InvitationPropagator<MemoryStore, RecordingSender>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::new());
        let propagator = InvitationPropagator::new(&store, &sender);

        (store, sender, propagator)
    }

    #[tokio::test]
    async fn test_propagation_end_to_end() {
        let (store, sender, propagator) = propagator();

        store.insert_user(user("a"));
        store.insert_user(user("y"));
        store.insert_friends("y", FriendsList {
            friends: uids(&["someone-else"]),
        });
        store.insert_invitations("y", InvitationsList::default());

        // a's friends went from [x] to [x, y]
        let outcomes = propagator
            .on_friends_update("a", &uids(&["x"]), &uids(&["x", "y"]))
            .await;

        assert_eq!(
            outcomes,
            vec![("y".to_string(), PropagationOutcome::Applied)]
        );

        let invitations = store.invitations_by_id("y").await.unwrap().doc;
        assert_eq!(
            invitations.invitations,
            uids(&["a"]),
            "y should have exactly one invitation, from a"
        );

        let attempts = sender.attempts();
        assert_eq!(attempts.len(), 1, "one notification attempt for y");
        assert_eq!(attempts[0].0, vec!["tok-y".to_string()]);
    }

    #[tokio::test]
    async fn test_redelivery_is_idempotent() {
        let (store, _sender, propagator) = propagator();

        store.insert_user(user("a"));
        store.insert_user(user("b"));
        store.insert_friends("b", FriendsList::default());
        store.insert_invitations("b", InvitationsList::default());

        let first = propagator.propagate("a", "b").await;
        let second = propagator.propagate("a", "b").await;

        assert_eq!(first, PropagationOutcome::Applied);
        assert_eq!(second, PropagationOutcome::AlreadyInvited);

        let invitations = store.invitations_by_id("b").await.unwrap().doc;
        assert_eq!(
            invitations.invitations,
            uids(&["a"]),
            "the entry should never be duplicated"
        );
    }

    #[tokio::test]
    async fn test_already_friends_writes_nothing() {
        let (store, sender, propagator) = propagator();

        store.insert_friends("b", FriendsList { friends: uids(&["a"]) });
        store.insert_invitations("b", InvitationsList::default());

        let before = store.invitations_by_id("b").await.unwrap().revision;
        let outcome = propagator.propagate("a", "b").await;
        let after = store.invitations_by_id("b").await.unwrap().revision;

        assert_eq!(outcome, PropagationOutcome::AlreadyFriends);
        assert_eq!(before, after, "no invitations write should occur");
        assert_eq!(sender.attempt_count(), 0, "no notification should be sent");
    }

    #[tokio::test]
    async fn test_missing_documents_are_terminal() {
        let (store, _sender, propagator) = propagator();

        assert_eq!(
            propagator.propagate("a", "ghost").await,
            PropagationOutcome::PeerMissing
        );

        store.insert_friends("half", FriendsList::default());
        assert_eq!(
            propagator.propagate("a", "half").await,
            PropagationOutcome::InvitationsMissing
        );
    }

    #[tokio::test]
    async fn test_removals_and_noops_are_silent() {
        let (_store, sender, propagator) = propagator();

        let same = uids(&["x", "y"]);
        assert!(propagator.on_friends_update("a", &same, &same).await.is_empty());

        let removed = propagator
            .on_friends_update("a", &uids(&["x", "y"]), &uids(&["x"]))
            .await;
        assert!(removed.is_empty());

        assert_eq!(sender.attempt_count(), 0);
    }

    #[tokio::test]
    async fn test_multiple_additions_all_propagate() {
        let (store, sender, propagator) = propagator();

        for peer in ["p", "q"] {
            store.insert_user(user(peer));
            store.insert_friends(peer, FriendsList::default());
            store.insert_invitations(peer, InvitationsList::default());
        }

        let outcomes = propagator
            .on_friends_update("a", &[], &uids(&["p", "q"]))
            .await;

        assert_eq!(
            outcomes,
            vec![
                ("p".to_string(), PropagationOutcome::Applied),
                ("q".to_string(), PropagationOutcome::Applied),
            ]
        );
        assert_eq!(sender.attempt_count(), 2);
    }

    /// A store whose first invitations write loses to a racing writer that
    /// sneaks `racing_uid` into the list, forcing one conflict.
    struct RacingStore {
        inner: MemoryStore,
        racing_uid: Uid,
        raced: std::sync::atomic::AtomicBool,
    }

    impl RacingStore {
        fn new(inner: MemoryStore, racing_uid: &str) -> Self {
            Self {
                inner,
                racing_uid: racing_uid.to_string(),
                raced: Default::default(),
            }
        }
    }

    #[async_trait::async_trait]
    impl crate::store::DocumentStore for RacingStore {
        async fn user_by_id(&self, uid: &str) -> crate::store::Result<UserRecord> {
            self.inner.user_by_id(uid).await
        }

        async fn users_by_display_name(
            &self,
            display_name: &str,
        ) -> crate::store::Result<Vec<UserRecord>> {
            self.inner.users_by_display_name(display_name).await
        }

        async fn list_user_ids(&self) -> crate::store::Result<Vec<Uid>> {
            self.inner.list_user_ids().await
        }

        async fn delete_user(&self, uid: &str) -> crate::store::Result<()> {
            self.inner.delete_user(uid).await
        }

        async fn friends_by_id(&self, uid: &str) -> crate::store::Result<FriendsList> {
            self.inner.friends_by_id(uid).await
        }

        async fn delete_friends(&self, uid: &str) -> crate::store::Result<()> {
            self.inner.delete_friends(uid).await
        }

        async fn invitations_by_id(
            &self,
            uid: &str,
        ) -> crate::store::Result<Versioned<InvitationsList>> {
            self.inner.invitations_by_id(uid).await
        }

        async fn update_invitations(
            &self,
            uid: &str,
            list: &InvitationsList,
            revision: &str,
        ) -> crate::store::Result<()> {
            let already_raced = self.raced.swap(true, std::sync::atomic::Ordering::SeqCst);

            if !already_raced {
                // The racing writer lands first, invalidating this revision
                let current = self.inner.invitations_by_id(uid).await?;
                let mut racing = current.doc.clone();
                racing.insert(&self.racing_uid);

                self.inner
                    .update_invitations(uid, &racing, &current.revision)
                    .await?;
            }

            self.inner.update_invitations(uid, list, revision).await
        }

        async fn delete_invitations(&self, uid: &str) -> crate::store::Result<()> {
            self.inner.delete_invitations(uid).await
        }

        async fn managers_by_id(
            &self,
            uid: &str,
        ) -> crate::store::Result<Versioned<crate::store::ManagerList>> {
            self.inner.managers_by_id(uid).await
        }

        async fn update_managers(
            &self,
            uid: &str,
            list: &crate::store::ManagerList,
            revision: &str,
        ) -> crate::store::Result<()> {
            self.inner.update_managers(uid, list, revision).await
        }

        async fn delete_managers(&self, uid: &str) -> crate::store::Result<()> {
            self.inner.delete_managers(uid).await
        }
    }

    #[tokio::test]
    async fn test_lost_write_is_retried() {
        let inner = MemoryStore::new();
        inner.insert_friends("b", FriendsList::default());
        inner.insert_invitations("b", InvitationsList::default());

        let store = Arc::new(RacingStore::new(inner, "zed"));
        let sender = Arc::new(RecordingSender::new());
        let propagator = InvitationPropagator::new(&store, &sender);

        let outcome = propagator.propagate("a", "b").await;

        assert_eq!(
            outcome,
            PropagationOutcome::Applied,
            "a lost write should be retried against the fresh revision"
        );

        let invitations = store.invitations_by_id("b").await.unwrap().doc;
        assert_eq!(
            invitations.invitations,
            uids(&["zed", "a"]),
            "both the racing entry and the retried entry should survive"
        );
    }

    #[tokio::test]
    async fn test_racing_duplicate_resolves_to_already_invited() {
        let inner = MemoryStore::new();
        inner.insert_friends("b", FriendsList::default());
        inner.insert_invitations("b", InvitationsList::default());

        // The racing writer inserts the same owner we're propagating
        let store = Arc::new(RacingStore::new(inner, "a"));
        let sender = Arc::new(RecordingSender::new());
        let propagator = InvitationPropagator::new(&store, &sender);

        let outcome = propagator.propagate("a", "b").await;

        assert_eq!(
            outcome,
            PropagationOutcome::AlreadyInvited,
            "the retry should notice the entry already landed"
        );

        let invitations = store.invitations_by_id("b").await.unwrap().doc;
        assert_eq!(
            invitations.invitations,
            uids(&["a"]),
            "the entry must exist exactly once"
        );
    }

    #[tokio::test]
    async fn test_push_failure_does_not_fail_propagation() {
        let (store, sender, propagator) = propagator();

        store.insert_user(user("b"));
        store.insert_friends("b", FriendsList::default());
        store.insert_invitations("b", InvitationsList::default());
        sender.set_failing(true);

        let outcome = propagator.propagate("a", "b").await;

        assert_eq!(
            outcome,
            PropagationOutcome::Applied,
            "a failed push must not surface as a propagation failure"
        );

        let invitations = store.invitations_by_id("b").await.unwrap().doc;
        assert_eq!(invitations.invitations, uids(&["a"]));
    }
}
