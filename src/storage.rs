use crate::{error::StoreError, lease::Lease, time};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tracing::trace;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Document store backing [`LeaseLock`](crate::lock::LeaseLock).
///
/// Implementations must enforce uniqueness of `name` per collection
/// atomically at insert time and report violations as
/// [`StoreError::Duplicate`]. Expiry is passive: documents past
/// `expires_at` are removed on the store's own schedule.
#[async_trait]
pub trait LeaseStore: Send + Sync + std::fmt::Debug {
    async fn insert(&self, collection: &str, lease: Lease) -> StoreResult<()>;

    /// Returns whether a document was removed. Missing documents are not an error.
    async fn delete(&self, collection: &str, name: &str) -> StoreResult<bool>;

    async fn find(&self, collection: &str, name: &str) -> StoreResult<Option<Lease>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DocumentKey {
    collection: String,
    name: String,
}

impl DocumentKey {
    fn new(collection: &str, name: &str) -> Self {
        Self {
            collection: collection.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct InMemoryStore {
    documents: DashMap<DocumentKey, Lease>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Removes every document whose `expires_at` has passed and returns how
    /// many were removed.
    pub fn reap_expired(&self) -> usize {
        let now = time::now();
        let before = self.documents.len();
        self.documents.retain(|_, lease| !lease.is_expired(now));
        let reaped = before.saturating_sub(self.documents.len());
        if reaped > 0 {
            trace!(reaped, "reaped expired leases");
        }
        reaped
    }

    /// Runs [`reap_expired`](Self::reap_expired) every `interval` until the
    /// handle is aborted.
    pub fn spawn_reaper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                store.reap_expired();
            }
        })
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeaseStore for InMemoryStore {
    async fn insert(&self, collection: &str, lease: Lease) -> StoreResult<()> {
        match self.documents.entry(DocumentKey::new(collection, &lease.name)) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                collection: collection.to_string(),
                name: lease.name,
            }),
            Entry::Vacant(slot) => {
                slot.insert(lease);
                Ok(())
            }
        }
    }

    async fn delete(&self, collection: &str, name: &str) -> StoreResult<bool> {
        Ok(self.documents.remove(&DocumentKey::new(collection, name)).is_some())
    }

    async fn find(&self, collection: &str, name: &str) -> StoreResult<Option<Lease>> {
        Ok(self
            .documents
            .get(&DocumentKey::new(collection, name))
            .map(|entry| entry.clone()))
    }
}
