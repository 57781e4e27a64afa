use async_trait::async_trait;
use thiserror::Error;

mod data;
pub use data::*;

mod memory;
pub use memory::*;

mod rest;
pub use rest::*;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// An unknown or internal error happened with the store
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A document doesn't exist
    #[error("{collection}/{id} doesn't exist")]
    NotFound {
        collection: &'static str,
        id: String,
    },
    /// A versioned write lost against a concurrent writer
    #[error("{collection}/{id} was modified by another writer")]
    Conflict {
        collection: &'static str,
        id: String,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Represents a type that can fetch and mutate matchpoint documents.
///
/// Versioned reads return the document together with a [Revision]; versioned
/// writes take the expected revision and fail with [StoreError::Conflict] when
/// another writer got there first.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn user_by_id(&self, uid: &str) -> Result<UserRecord>;
    async fn users_by_display_name(&self, display_name: &str) -> Result<Vec<UserRecord>>;
    async fn list_user_ids(&self) -> Result<Vec<Uid>>;
    async fn delete_user(&self, uid: &str) -> Result<()>;

    async fn friends_by_id(&self, uid: &str) -> Result<FriendsList>;
    async fn delete_friends(&self, uid: &str) -> Result<()>;

    async fn invitations_by_id(&self, uid: &str) -> Result<Versioned<InvitationsList>>;
    async fn update_invitations(
        &self,
        uid: &str,
        list: &InvitationsList,
        revision: &str,
    ) -> Result<()>;
    async fn delete_invitations(&self, uid: &str) -> Result<()>;

    async fn managers_by_id(&self, uid: &str) -> Result<Versioned<ManagerList>>;
    async fn update_managers(&self, uid: &str, list: &ManagerList, revision: &str) -> Result<()>;
    async fn delete_managers(&self, uid: &str) -> Result<()>;
}
