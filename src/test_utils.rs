use crate::{
    error::StoreError,
    lease::Lease,
    storage::{InMemoryStore, LeaseStore, StoreResult},
};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Wraps an [`InMemoryStore`], failing the next `n` inserts with
/// [`StoreError::Unavailable`] and counting every insert attempt.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: Arc<InMemoryStore>,
    failures: AtomicUsize,
    inserts: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn insert_attempts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &Arc<InMemoryStore> {
        &self.inner
    }

    fn take_failure(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl LeaseStore for FlakyStore {
    async fn insert(&self, collection: &str, lease: Lease) -> StoreResult<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        self.inner.insert(collection, lease).await
    }

    async fn delete(&self, collection: &str, name: &str) -> StoreResult<bool> {
        self.inner.delete(collection, name).await
    }

    async fn find(&self, collection: &str, name: &str) -> StoreResult<Option<Lease>> {
        self.inner.find(collection, name).await
    }
}
