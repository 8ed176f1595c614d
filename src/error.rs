//! Error types for the Safar library
//!
//! This module provides the error types for all Safar operations, built with thiserror.

use crate::types::ThreadId;
use thiserror::Error;

/// Main error type for Safar library operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AgentError {
    /// LLM provider error
    #[error("LLM provider error: {0}")]
    Provider(String),

    /// Thread not found
    #[error("Thread not found: {0}")]
    ThreadNotFound(ThreadId),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Tours catalogue error
    #[error("Tours catalogue error: {0}")]
    Catalog(#[from] CatalogError),

    /// Front-end delivery error
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tool not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool already registered with same name
    #[error("Tool already registered: {0}")]
    ToolAlreadyRegistered(String),

    /// Invalid tool parameters
    #[error("Invalid tool parameters for {tool_name}: {reason}")]
    InvalidToolParameters { tool_name: String, reason: String },

    /// Tool execution timeout
    #[error("Tool execution timeout for {tool_name} after {timeout:?}")]
    ToolTimeout {
        tool_name: String,
        timeout: std::time::Duration,
    },

    /// The model kept requesting tools without producing an answer
    #[error("No reply after {rounds} model rounds")]
    ToolLoopExhausted { rounds: usize },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Storage-related errors
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StorageError {
    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Resource already exists
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Internal storage error
    #[error("Internal storage error: {0}")]
    Internal(String),
}

/// Errors talking to the tours REST API
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CatalogError {
    /// Transport failure (connect, timeout, TLS)
    #[error("Tours API request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status
    #[error("Tours API {endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The envelope said `success: false`
    #[error("Tours API {endpoint} reported failure: {message}")]
    Unsuccessful { endpoint: String, message: String },

    /// The body did not have the expected shape
    #[error("Tours API {endpoint} returned malformed data: {message}")]
    Decode { endpoint: String, message: String },
}

/// Errors delivering replies to a front-end
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ChannelError {
    /// Transport failure
    #[error("{channel} request failed: {source}")]
    Http {
        channel: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The remote platform rejected the request
    #[error("{channel} rejected the request with HTTP {status}")]
    Rejected { channel: &'static str, status: u16 },

    /// Bot API failure
    #[error("{channel} delivery failed: {reason}")]
    Delivery {
        channel: &'static str,
        reason: String,
    },
}

/// Type alias for Safar library Result
pub type Result<T> = std::result::Result<T, AgentError>;

/// Type alias for tours catalogue Result
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_not_found_display() {
        let thread_id = ThreadId::new();
        let err = AgentError::ThreadNotFound(thread_id);
        let display = format!("{}", err);
        assert!(display.contains("Thread not found"));
        assert!(display.contains(&thread_id.to_string()));
    }

    #[test]
    fn test_catalog_status_display() {
        let err = CatalogError::Status {
            endpoint: "tours".to_string(),
            status: 502,
        };
        let display = format!("{}", err);
        assert!(display.contains("tours"));
        assert!(display.contains("502"));
    }

    #[test]
    fn test_tool_timeout_display() {
        let err = AgentError::ToolTimeout {
            tool_name: "search_tours".to_string(),
            timeout: std::time::Duration::from_secs(30),
        };
        let display = format!("{}", err);
        assert!(display.contains("search_tours"));
        assert!(display.contains("30s"));
    }

    #[test]
    fn test_error_conversion_storage_to_agent() {
        let storage_err = StorageError::NotFound("x".to_string());
        let agent_err: AgentError = storage_err.into();
        assert!(matches!(agent_err, AgentError::Storage(_)));
    }

    #[test]
    fn test_error_conversion_catalog_to_agent() {
        let err = CatalogError::Unsuccessful {
            endpoint: "locations".to_string(),
            message: "down".to_string(),
        };
        let agent_err: AgentError = err.into();
        assert!(matches!(agent_err, AgentError::Catalog(_)));
    }

    #[test]
    fn test_error_conversion_channel_to_agent() {
        let err = ChannelError::Rejected {
            channel: "chatwoot",
            status: 401,
        };
        let agent_err: AgentError = err.into();
        assert!(matches!(agent_err, AgentError::Channel(_)));
        assert!(agent_err.to_string().contains("401"));
    }
}
