//! Conversation threads
//!
//! A thread is the agent-side memory of one conversation: the ordered message
//! history replayed to the LLM on every turn.

use crate::context::Context;
use crate::types::ThreadId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a conversation thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    /// Thread accepts new messages
    Active,
    /// Thread was closed (e.g. the customer started a new consultation)
    Closed,
}

/// A conversation thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Unique identifier for the thread
    pub id: ThreadId,
    /// Current status of the thread
    pub status: ThreadStatus,
    /// Message history
    pub context: Context,
    /// When the thread was created
    pub created_at: DateTime<Utc>,
    /// When the thread was last updated
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    /// Create a new thread with a random id
    pub fn new() -> Self {
        Self::with_id(ThreadId::new())
    }

    /// Create a new thread under a known id
    pub fn with_id(id: ThreadId) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: ThreadStatus::Active,
            context: Context::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the thread's updated_at timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Check if the thread is active
    pub fn is_active(&self) -> bool {
        self.status == ThreadStatus::Active
    }

    /// Close the thread
    pub fn close(&mut self) {
        self.status = ThreadStatus::Closed;
        self.touch();
    }
}

impl Default for Thread {
    fn default() -> Self {
        Self::new()
    }
}
