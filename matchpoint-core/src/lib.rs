mod cleanup;
mod diff;
mod dispatch;
mod games;
mod identity;
mod invitations;
mod push;
mod store;

use std::sync::Arc;

pub use cleanup::*;
pub use diff::*;
pub use dispatch::*;
pub use games::*;
pub use invitations::*;

// The client modules each define their own Result alias, so their items are
// re-exported by name instead of by glob
pub use identity::{
    IdentityDirectory, IdentityError, IdentityPage, MemoryDirectory, RestDirectory, PAGE_SIZE,
};
pub use push::{
    DeliveryPolicy, FcmSender, Notification, PushError, PushSender, RecordingSender,
};
pub use store::{
    DocumentStore, FriendsList, GameId, GameRecord, InvitationsList, ManagerList, MemoryStore,
    RestStore, Revision, StoreError, Uid, UserRecord, Versioned,
};

/// The matchpoint backend, reacting to friends and game document changes and
/// reconciling stale accounts.
///
/// Generic over its three external collaborators: the document store, the
/// identity directory, and the push transport. All of them are constructed
/// once and shared across events.
pub struct Backend<S, I, P> {
    pub invitations: InvitationPropagator<S, P>,
    pub games: GameEvents<S, P>,
    pub cleanup: AccountReconciler<S, I>,
}

impl<S, I, P> Backend<S, I, P>
where
    S: DocumentStore,
    I: IdentityDirectory,
    P: PushSender,
{
    /// `sentinel` is the display name marking synthetic test accounts for cleanup.
    pub fn new(store: S, directory: I, sender: P, sentinel: &str) -> Self {
        let store = Arc::new(store);
        let directory = Arc::new(directory);
        let sender = Arc::new(sender);

        Self {
            invitations: InvitationPropagator::new(&store, &sender),
            games: GameEvents::new(&store, &sender),
            cleanup: AccountReconciler::new(&store, &directory, sentinel),
        }
    }
}
