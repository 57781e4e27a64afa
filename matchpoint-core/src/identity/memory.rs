use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{IdentityDirectory, IdentityPage, Result};
use crate::store::Uid;

/// An in-memory identity directory, used by tests and local development.
///
/// Continuation tokens are stringified offsets into the uid list. Deletions
/// and list calls are recorded so tests can assert on them.
#[derive(Debug)]
pub struct MemoryDirectory {
    uids: Mutex<Vec<Uid>>,
    page_size: usize,
    list_calls: AtomicUsize,
    deleted: Mutex<Vec<Uid>>,
}

impl MemoryDirectory {
    pub fn new(page_size: usize) -> Self {
        Self {
            uids: Default::default(),
            page_size,
            list_calls: AtomicUsize::new(0),
            deleted: Default::default(),
        }
    }

    pub fn add(&self, uid: &str) {
        self.uids.lock().push(uid.to_string());
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.uids.lock().iter().any(|u| u == uid)
    }

    /// Every uid deleted so far, in deletion order
    pub fn deleted(&self) -> Vec<Uid> {
        self.deleted.lock().clone()
    }

    /// How many pages have been listed so far
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityDirectory for MemoryDirectory {
    async fn list_page(&self, page_token: Option<&str>) -> Result<IdentityPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let uids = self.uids.lock();

        let offset: usize = page_token.map(|t| t.parse().unwrap_or(0)).unwrap_or(0);
        let end = (offset + self.page_size).min(uids.len());

        let next_token = if end < uids.len() {
            Some(end.to_string())
        } else {
            None
        };

        Ok(IdentityPage {
            uids: uids[offset..end].to_vec(),
            next_token,
        })
    }

    async fn delete_users(&self, to_delete: &[Uid]) -> Result<()> {
        let mut uids = self.uids.lock();

        uids.retain(|u| !to_delete.contains(u));
        self.deleted.lock().extend(to_delete.iter().cloned());

        Ok(())
    }
}
