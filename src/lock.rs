// Lease lock - named mutual exclusion on top of a document store
//
// The store's uniqueness constraint on `name` is the only synchronisation:
// the lock keeps no in-process state, so it works across processes, and it
// is not reentrant.

use crate::{
    config::{LockConfig, LockOptions},
    lease::Lease,
    storage::LeaseStore,
    time, Error, Result,
};
use std::{future::Future, sync::Arc};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LeaseLock {
    store: Arc<dyn LeaseStore>,
    config: LockConfig,
}

impl LeaseLock {
    pub fn new(store: Arc<dyn LeaseStore>, config: LockConfig) -> Self {
        Self { store, config }
    }

    pub fn collection(&self) -> &str {
        &self.config.collection
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Acquire the lease `name`.
    ///
    /// On contention, sleeps for the retry interval and tries again forever
    /// unless retrying is disabled, in which case [`Error::LockContended`] is
    /// returned. Any other store failure is returned as is.
    pub async fn acquire(&self, name: &str, options: LockOptions) -> Result<Lease> {
        let options = options.merged_over(&self.config.defaults);
        let mut attempts: u64 = 0;

        loop {
            attempts += 1;
            let created_at = time::now();
            let expires_at = options
                .expires_in
                .map(|ttl| time::deadline_after(created_at, ttl))
                .transpose()?;
            let lease = Lease::new(name, created_at, expires_at);

            match self.store.insert(&self.config.collection, lease.clone()).await {
                Ok(()) => {
                    debug!(
                        collection = %self.config.collection,
                        name,
                        id = %lease.id,
                        attempts,
                        "lease acquired"
                    );
                    return Ok(lease);
                }
                Err(err) if err.is_duplicate() => {
                    if !options.retry {
                        debug!(collection = %self.config.collection, name, "lease contended");
                        return Err(Error::LockContended {
                            name: name.to_string(),
                        });
                    }
                    debug!(
                        collection = %self.config.collection,
                        name,
                        attempts,
                        retry_in = ?options.retry_interval,
                        "lease contended, retrying"
                    );
                    tokio::time::sleep(options.retry_interval).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Single attempt; fails with [`Error::LockContended`] if the lease is held.
    pub async fn try_acquire(&self, name: &str) -> Result<Lease> {
        self.acquire(name, LockOptions::new().retry(false)).await
    }

    /// Delete the lease `name`, whoever holds it. Releasing a lease that does
    /// not exist is a no-op.
    pub async fn release(&self, name: &str) -> Result<()> {
        let removed = self.store.delete(&self.config.collection, name).await?;
        debug!(collection = %self.config.collection, name, removed, "lease released");
        Ok(())
    }

    /// The live lease document for `name`, if any. Expired leases are
    /// reported until the store reaps them.
    pub async fn current(&self, name: &str) -> Result<Option<Lease>> {
        Ok(self.store.find(&self.config.collection, name).await?)
    }

    /// Acquire `name`, run `callback`, then release.
    ///
    /// The lease is released whether the callback succeeds or fails. If the
    /// callback fails, its error is returned and a release failure is only
    /// logged.
    pub async fn protect<F, Fut, T>(&self, name: &str, options: LockOptions, callback: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.acquire(name, options).await?;

        match callback().await {
            Ok(value) => {
                self.release(name).await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(release_err) = self.release(name).await {
                    warn!(
                        collection = %self.config.collection,
                        name,
                        error = %release_err,
                        "failed to release lease after callback error"
                    );
                }
                Err(err)
            }
        }
    }
}
