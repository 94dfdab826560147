use futures_util::future::join_all;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tollgate::{
    test_utils::FlakyStore, Error, InMemoryStore, LeaseLock, LockConfig, LockOptions, StoreError,
};
use tokio::time::{sleep, timeout, Instant};

fn fast_retry() -> LockOptions {
    LockOptions::new().retry_interval(Duration::from_millis(10))
}

#[tokio::test]
async fn test_racing_callers_are_serialised() {
    let store = Arc::new(InMemoryStore::new());
    // Independent lock instances sharing one store, like separate processes
    let first = LeaseLock::new(store.clone(), LockConfig::default());
    let second = LeaseLock::new(store.clone(), LockConfig::default());

    first.acquire("job:42", fast_retry()).await.unwrap();

    let waiter = tokio::spawn(async move {
        let started = Instant::now();
        second.acquire("job:42", fast_retry()).await.unwrap();
        started.elapsed()
    });

    sleep(Duration::from_millis(100)).await;
    assert!(!waiter.is_finished(), "second caller must block while the lease is held");

    first.release("job:42").await.unwrap();
    let waited = timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
    assert!(waited >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_protect_never_overlaps() {
    let store = Arc::new(InMemoryStore::new());
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));

    let workers = (0..8).map(|_| {
        let lock = LeaseLock::new(store.clone(), LockConfig::default());
        let inside = inside.clone();
        let max_inside = max_inside.clone();
        async move {
            lock.protect("critical", fast_retry(), || async {
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            })
            .await
        }
    });

    for result in join_all(workers).await {
        result.unwrap();
    }
    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_exactly_one_try_acquire_wins() {
    let lock = LeaseLock::new(Arc::new(InMemoryStore::new()), LockConfig::default());

    let attempts = (0..16).map(|_| lock.try_acquire("job:42"));
    let results = join_all(attempts).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(Error::is_contended));
}

#[tokio::test]
async fn test_release_is_idempotent() {
    let lock = LeaseLock::new(Arc::new(InMemoryStore::new()), LockConfig::default());

    lock.release("never-acquired").await.unwrap();

    lock.acquire("job:42", LockOptions::new()).await.unwrap();
    lock.release("job:42").await.unwrap();
    lock.release("job:42").await.unwrap();
}

#[tokio::test]
async fn test_release_needs_only_the_name() {
    let store = Arc::new(InMemoryStore::new());
    let holder = LeaseLock::new(store.clone(), LockConfig::default());
    let other = LeaseLock::new(store, LockConfig::default());

    holder.acquire("job:42", LockOptions::new()).await.unwrap();
    other.release("job:42").await.unwrap();

    other.try_acquire("job:42").await.unwrap();
}

#[tokio::test]
async fn test_collections_are_independent() {
    let store = Arc::new(InMemoryStore::new());
    let jobs = LeaseLock::new(store.clone(), LockConfig::new("jobs").unwrap());
    let imports = LeaseLock::new(store, LockConfig::new("imports").unwrap());

    jobs.try_acquire("42").await.unwrap();
    imports.try_acquire("42").await.unwrap();
    assert!(jobs.try_acquire("42").await.unwrap_err().is_contended());
}

#[tokio::test]
async fn test_expired_lease_is_reacquired_after_reaping() {
    let store = Arc::new(InMemoryStore::new());
    let lock = LeaseLock::new(store.clone(), LockConfig::default());

    lock.acquire("job:42", LockOptions::new().expires_in(Duration::from_secs(1)))
        .await
        .unwrap();

    // Past expiry but not yet reaped: still held
    sleep(Duration::from_millis(1100)).await;
    assert!(lock.try_acquire("job:42").await.unwrap_err().is_contended());

    let reaper = store.spawn_reaper(Duration::from_millis(50));
    let lease = timeout(Duration::from_secs(2), lock.acquire("job:42", fast_retry()))
        .await
        .expect("lease should be acquired once the store reaps the expired one")
        .unwrap();
    reaper.abort();

    assert_eq!(lease.expires_at, None);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_store_failures_propagate_without_retry() {
    let store = Arc::new(FlakyStore::new(Arc::new(InMemoryStore::new())));
    let lock = LeaseLock::new(store.clone(), LockConfig::default());

    store.fail_next(1);
    let err = lock.acquire("job:42", fast_retry()).await.unwrap_err();

    assert!(matches!(err, Error::Store(StoreError::Unavailable(_))));
    assert_eq!(store.insert_attempts(), 1);
    assert!(store.inner().is_empty());

    lock.acquire("job:42", fast_retry()).await.unwrap();
    assert_eq!(store.insert_attempts(), 2);
}

#[tokio::test]
async fn test_contention_retries_at_fixed_interval() {
    let store = Arc::new(FlakyStore::new(Arc::new(InMemoryStore::new())));
    let lock = LeaseLock::new(store.clone(), LockConfig::default());
    lock.acquire("job:42", LockOptions::new()).await.unwrap();

    let blocked = timeout(
        Duration::from_millis(250),
        lock.acquire("job:42", LockOptions::new().retry_interval(Duration::from_millis(100))),
    )
    .await;

    assert!(blocked.is_err());
    // One initial attempt plus two or three retries within the window
    let retries = store.insert_attempts() - 2;
    assert!((2..=3).contains(&retries), "unexpected retry count {retries}");
}
