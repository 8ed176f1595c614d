//! Contract tests for the ThreadStore trait
//!
//! Every ThreadStore implementation is expected to behave like the in-memory one.

use safar::storage::ThreadStore;
use safar::{InMemoryThreadStore, Message, StorageError, Thread, ThreadStatus};
use tokio_test::{assert_err, assert_ok};

/// Test the contract for ThreadStore::create
///
/// - A new thread is stored and its id returned
/// - Creating the same thread twice fails with AlreadyExists
#[tokio::test]
async fn test_thread_store_create_contract() {
    let store = InMemoryThreadStore::new();
    let thread = Thread::new();
    let thread_id = thread.id;

    let result = store.create(thread.clone()).await;
    assert_eq!(
        result.unwrap(),
        thread_id,
        "ThreadStore::create should return the thread ID"
    );

    let duplicate = store.create(thread).await;
    assert!(
        matches!(duplicate, Err(StorageError::AlreadyExists(_))),
        "ThreadStore::create should reject a duplicate thread ID"
    );
}

/// Test the contract for ThreadStore::get
#[tokio::test]
async fn test_thread_store_get_contract() {
    let store = InMemoryThreadStore::new();
    let thread = Thread::new();
    let thread_id = thread.id;

    assert!(
        store.get(&thread_id).await.unwrap().is_none(),
        "ThreadStore::get should return None for an unknown thread"
    );

    store.create(thread).await.unwrap();

    let retrieved = store.get(&thread_id).await.unwrap();
    assert_eq!(
        retrieved.map(|t| t.id),
        Some(thread_id),
        "ThreadStore::get should return the stored thread"
    );
}

/// Test the contract for ThreadStore::update
///
/// - Updating an unknown thread fails with NotFound
/// - Updates to status and history are persisted
#[tokio::test]
async fn test_thread_store_update_contract() {
    let store = InMemoryThreadStore::new();
    let mut thread = Thread::new();
    let thread_id = thread.id;

    let result = store.update(&thread_id, thread.clone()).await;
    assert!(
        matches!(result, Err(StorageError::NotFound(_))),
        "ThreadStore::update should fail for an unknown thread"
    );

    store.create(thread.clone()).await.unwrap();

    thread.context.add_message(Message::user("Dubayga tur bormi?"));
    thread.close();
    store.update(&thread_id, thread).await.unwrap();

    let retrieved = store.get(&thread_id).await.unwrap().unwrap();
    assert_eq!(retrieved.status, ThreadStatus::Closed);
    assert_eq!(retrieved.context.len(), 1);
}

/// Test the contract for ThreadStore::delete
#[tokio::test]
async fn test_thread_store_delete_contract() {
    let store = InMemoryThreadStore::new();
    let thread = Thread::new();
    let thread_id = thread.id;

    assert_err!(
        store.delete(&thread_id).await,
        "ThreadStore::delete should fail for an unknown thread"
    );

    store.create(thread).await.unwrap();
    assert_ok!(store.delete(&thread_id).await);

    assert!(
        store.get(&thread_id).await.unwrap().is_none(),
        "ThreadStore::delete should remove the thread"
    );
}

/// Test the contract for ThreadStore::list
#[tokio::test]
async fn test_thread_store_list_contract() {
    let store = InMemoryThreadStore::new();
    assert!(store.list().await.unwrap().is_empty());

    let threads = [Thread::new(), Thread::new(), Thread::new()];
    let ids: Vec<_> = threads.iter().map(|t| t.id).collect();
    for thread in threads {
        store.create(thread).await.unwrap();
    }

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 3, "ThreadStore::list should return every thread");
    for id in &ids {
        assert!(listed.contains(id));
    }
}

/// Test the contract for ThreadStore::exists
#[tokio::test]
async fn test_thread_store_exists_contract() {
    let store = InMemoryThreadStore::new();
    let thread = Thread::new();
    let thread_id = thread.id;

    assert!(!store.exists(&thread_id).await.unwrap());
    store.create(thread).await.unwrap();
    assert!(store.exists(&thread_id).await.unwrap());
}

/// Concurrent writers on distinct threads do not interfere
#[tokio::test]
async fn test_thread_store_concurrent_creates() {
    let store = std::sync::Arc::new(InMemoryThreadStore::new());

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.create(Thread::new()).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(store.list().await.unwrap().len(), 20);
}
