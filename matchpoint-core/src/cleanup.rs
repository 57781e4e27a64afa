use std::{collections::HashSet, sync::Arc};

use log::{info, warn};
use thiserror::Error;

use crate::{
    identity::{IdentityDirectory, IdentityError},
    store::{DocumentStore, StoreError, Uid},
};

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// The directory handed back a continuation token it already issued
    /// during this run. Treated as an error instead of looping forever.
    #[error("directory returned page token {0:?} twice, aborting")]
    CursorRepeated(String),
}

/// The deletion set a reconciliation run ended up acting on.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub deleted: Vec<Uid>,
}

/// Cross-references the document store and the identity directory to find
/// accounts that should no longer exist, then cleans both sides up.
///
/// A uid lands in the deletion set if and only if its profile carries the
/// synthetic-account sentinel display name, or no profile document exists for
/// it at all.
pub struct AccountReconciler<S, I> {
    store: Arc<S>,
    directory: Arc<I>,
    /// Display name marking synthetic test accounts
    sentinel: String,
}

impl<S, I> AccountReconciler<S, I>
where
    S: DocumentStore,
    I: IdentityDirectory,
{
    pub fn new(store: &Arc<S>, directory: &Arc<I>, sentinel: &str) -> Self {
        Self {
            store: store.clone(),
            directory: directory.clone(),
            sentinel: sentinel.to_string(),
        }
    }

    pub async fn run(&self) -> Result<CleanupReport, CleanupError> {
        // The valid set is captured once, before anything is deleted, so later
        // steps always compare against the pre-deletion state
        let valid: HashSet<Uid> = self.store.list_user_ids().await?.into_iter().collect();

        let mut deleted: Vec<Uid> = Vec::new();
        let mut seen: HashSet<Uid> = HashSet::new();

        for user in self.store.users_by_display_name(&self.sentinel).await? {
            if seen.insert(user.uid.clone()) {
                deleted.push(user.uid);
            }
        }

        for uid in &deleted {
            self.purge_documents(uid).await;
        }

        let mut token: Option<String> = None;
        let mut used_tokens: HashSet<String> = HashSet::new();

        loop {
            let page = self.directory.list_page(token.as_deref()).await?;

            for uid in page.uids {
                if !valid.contains(&uid) && seen.insert(uid.clone()) {
                    deleted.push(uid);
                }
            }

            match page.next_token {
                // Any recurrence of an earlier token would cycle forever
                Some(next) if !used_tokens.insert(next.clone()) => {
                    return Err(CleanupError::CursorRepeated(next));
                }
                Some(next) => token = Some(next),
                None => break,
            }
        }

        if !deleted.is_empty() {
            self.directory.delete_users(&deleted).await?;
        }

        info!("cleanup removed {} account(s): {deleted:?}", deleted.len());

        Ok(CleanupReport { deleted })
    }

    /// Deletes every document a uid owns. Best effort: each call fails on its
    /// own and the run carries on.
    async fn purge_documents(&self, uid: &str) {
        let results = [
            ("users", self.store.delete_user(uid).await),
            ("friends", self.store.delete_friends(uid).await),
            ("invitations", self.store.delete_invitations(uid).await),
            ("managers", self.store.delete_managers(uid).await),
        ];

        for (collection, result) in results {
            match result {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => warn!("could not delete {collection}/{uid}: {e}"),
            }
        }
    }
}
