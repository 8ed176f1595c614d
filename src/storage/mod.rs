//! Thread storage backends
//!
//! This module provides a trait-based abstraction for conversation thread storage,
//! so the agent's memory can live in-process or in an external store.

use crate::error::StorageError;
use crate::thread::Thread;
use crate::types::ThreadId;
use async_trait::async_trait;

pub mod memory;

/// Trait for thread storage backends
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Create a new thread in the store
    ///
    /// # Returns
    ///
    /// The thread ID on success, or `StorageError::AlreadyExists`
    async fn create(&self, thread: Thread) -> Result<ThreadId, StorageError>;

    /// Get a thread by ID
    ///
    /// # Returns
    ///
    /// The thread if found, None if not found, or a storage error
    async fn get(&self, id: &ThreadId) -> Result<Option<Thread>, StorageError>;

    /// Replace an existing thread
    async fn update(&self, id: &ThreadId, thread: Thread) -> Result<(), StorageError>;

    /// Delete a thread by ID
    async fn delete(&self, id: &ThreadId) -> Result<(), StorageError>;

    /// List all thread IDs in the store
    async fn list(&self) -> Result<Vec<ThreadId>, StorageError>;

    /// Check if a thread exists
    async fn exists(&self, id: &ThreadId) -> Result<bool, StorageError> {
        Ok(self.get(id).await?.is_some())
    }
}
