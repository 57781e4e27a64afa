use async_trait::async_trait;
use thiserror::Error;

use crate::store::Uid;

mod memory;
pub use memory::*;

mod rest;
pub use rest::*;

pub type Result<T> = std::result::Result<T, IdentityError>;

/// How many identity records are requested per page.
pub const PAGE_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// An unknown or internal error happened with the directory
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

/// A single page of identity records.
#[derive(Debug, Clone)]
pub struct IdentityPage {
    pub uids: Vec<Uid>,
    /// Opaque continuation token for the next page. `None` means this was the last page.
    pub next_token: Option<String>,
}

/// Represents a directory of identity records that can be enumerated page by
/// page and cleaned up in bulk.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Lists one page of uids, continuing from the given token.
    async fn list_page(&self, page_token: Option<&str>) -> Result<IdentityPage>;

    /// Deletes the identity records for every given uid.
    async fn delete_users(&self, uids: &[Uid]) -> Result<()>;
}
