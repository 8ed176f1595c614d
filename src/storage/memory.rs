//! In-memory thread storage implementation
//!
//! Threads live in a HashMap behind an async RwLock for the lifetime of the
//! process. Nothing is evicted.

use crate::error::StorageError;
use crate::storage::ThreadStore;
use crate::thread::Thread;
use crate::types::ThreadId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory thread storage
///
/// # Examples
///
/// ```
/// use safar::storage::ThreadStore;
/// use safar::{InMemoryThreadStore, Thread};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryThreadStore::new();
///     let thread_id = store.create(Thread::new()).await?;
///
///     assert!(store.get(&thread_id).await?.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryThreadStore {
    threads: Arc<RwLock<HashMap<ThreadId, Thread>>>,
}

impl InMemoryThreadStore {
    /// Create a new in-memory thread store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads currently stored
    pub async fn len(&self) -> usize {
        self.threads.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.threads.read().await.is_empty()
    }
}

#[async_trait]
impl ThreadStore for InMemoryThreadStore {
    async fn create(&self, thread: Thread) -> Result<ThreadId, StorageError> {
        let id = thread.id;
        let mut threads = self.threads.write().await;

        if threads.contains_key(&id) {
            return Err(StorageError::AlreadyExists(format!(
                "Thread with ID {} already exists",
                id
            )));
        }

        threads.insert(id, thread);
        Ok(id)
    }

    async fn get(&self, id: &ThreadId) -> Result<Option<Thread>, StorageError> {
        let threads = self.threads.read().await;
        Ok(threads.get(id).cloned())
    }

    async fn update(&self, id: &ThreadId, thread: Thread) -> Result<(), StorageError> {
        let mut threads = self.threads.write().await;

        if !threads.contains_key(id) {
            return Err(StorageError::NotFound(format!(
                "Thread with ID {} not found",
                id
            )));
        }

        threads.insert(*id, thread);
        Ok(())
    }

    async fn delete(&self, id: &ThreadId) -> Result<(), StorageError> {
        let mut threads = self.threads.write().await;

        if threads.remove(id).is_none() {
            return Err(StorageError::NotFound(format!(
                "Thread with ID {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn list(&self) -> Result<Vec<ThreadId>, StorageError> {
        let threads = self.threads.read().await;
        Ok(threads.keys().copied().collect())
    }

    async fn exists(&self, id: &ThreadId) -> Result<bool, StorageError> {
        let threads = self.threads.read().await;
        Ok(threads.contains_key(id))
    }
}
