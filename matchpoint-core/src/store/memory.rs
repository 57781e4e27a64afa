use async_trait::async_trait;
use dashmap::DashMap;

use super::{
    DocumentStore, FriendsList, InvitationsList, ManagerList, Result, StoreError, Uid, UserRecord,
    Versioned,
};

/// An in-memory document store, used by tests and local development.
///
/// Revisions are plain write counters per document, formatted as strings so
/// they stay opaque to callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<Uid, UserRecord>,
    friends: DashMap<Uid, FriendsList>,
    invitations: DashMap<Uid, (InvitationsList, u64)>,
    managers: DashMap<Uid, (ManagerList, u64)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: UserRecord) {
        self.users.insert(user.uid.clone(), user);
    }

    pub fn insert_friends(&self, uid: &str, list: FriendsList) {
        self.friends.insert(uid.to_string(), list);
    }

    pub fn insert_invitations(&self, uid: &str, list: InvitationsList) {
        self.invitations.insert(uid.to_string(), (list, 0));
    }

    pub fn insert_managers(&self, uid: &str, list: ManagerList) {
        self.managers.insert(uid.to_string(), (list, 0));
    }
}

fn not_found(collection: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection,
        id: id.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn user_by_id(&self, uid: &str) -> Result<UserRecord> {
        self.users
            .get(uid)
            .map(|u| u.clone())
            .ok_or_else(|| not_found("users", uid))
    }

    async fn users_by_display_name(&self, display_name: &str) -> Result<Vec<UserRecord>> {
        let users = self
            .users
            .iter()
            .filter(|u| u.display_name == display_name)
            .map(|u| u.clone())
            .collect();

        Ok(users)
    }

    async fn list_user_ids(&self) -> Result<Vec<Uid>> {
        Ok(self.users.iter().map(|u| u.key().clone()).collect())
    }

    async fn delete_user(&self, uid: &str) -> Result<()> {
        self.users
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| not_found("users", uid))
    }

    async fn friends_by_id(&self, uid: &str) -> Result<FriendsList> {
        self.friends
            .get(uid)
            .map(|f| f.clone())
            .ok_or_else(|| not_found("friends", uid))
    }

    async fn delete_friends(&self, uid: &str) -> Result<()> {
        self.friends
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| not_found("friends", uid))
    }

    async fn invitations_by_id(&self, uid: &str) -> Result<Versioned<InvitationsList>> {
        self.invitations
            .get(uid)
            .map(|entry| Versioned {
                doc: entry.0.clone(),
                revision: entry.1.to_string(),
            })
            .ok_or_else(|| not_found("invitations", uid))
    }

    async fn update_invitations(
        &self,
        uid: &str,
        list: &InvitationsList,
        revision: &str,
    ) -> Result<()> {
        let mut entry = self
            .invitations
            .get_mut(uid)
            .ok_or_else(|| not_found("invitations", uid))?;

        if entry.1.to_string() != revision {
            return Err(StoreError::Conflict {
                collection: "invitations",
                id: uid.to_string(),
            });
        }

        entry.0 = list.clone();
        entry.1 += 1;

        Ok(())
    }

    async fn delete_invitations(&self, uid: &str) -> Result<()> {
        self.invitations
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| not_found("invitations", uid))
    }

    async fn managers_by_id(&self, uid: &str) -> Result<Versioned<ManagerList>> {
        self.managers
            .get(uid)
            .map(|entry| Versioned {
                doc: entry.0.clone(),
                revision: entry.1.to_string(),
            })
            .ok_or_else(|| not_found("managers", uid))
    }

    async fn update_managers(&self, uid: &str, list: &ManagerList, revision: &str) -> Result<()> {
        let mut entry = self
            .managers
            .get_mut(uid)
            .ok_or_else(|| not_found("managers", uid))?;

        if entry.1.to_string() != revision {
            return Err(StoreError::Conflict {
                collection: "managers",
                id: uid.to_string(),
            });
        }

        entry.0 = list.clone();
        entry.1 += 1;

        Ok(())
    }

    async fn delete_managers(&self, uid: &str) -> Result<()> {
        self.managers
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| not_found("managers", uid))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_stale_revision_conflicts() {
        let store = MemoryStore::new();
        store.insert_invitations("alva", InvitationsList::default());

        let first = store.invitations_by_id("alva").await.unwrap();

        let mut updated = first.doc.clone();
        updated.insert("bo");

        store
            .update_invitations("alva", &updated, &first.revision)
            .await
            .expect("first write succeeds");

        // The old revision must be rejected now
        let mut racing = first.doc.clone();
        racing.insert("cleo");

        let error = store
            .update_invitations("alva", &racing, &first.revision)
            .await
            .expect_err("stale write is rejected");

        assert!(error.is_conflict(), "stale write should conflict");

        let current = store.invitations_by_id("alva").await.unwrap();
        assert_eq!(
            current.doc.invitations,
            vec!["bo".to_string()],
            "losing write should not be applied"
        );
    }

    #[tokio::test]
    async fn test_missing_documents_are_not_found() {
        let store = MemoryStore::new();

        let error = store.friends_by_id("nobody").await.expect_err("no doc");
        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "friends/nobody doesn't exist");
    }
}
