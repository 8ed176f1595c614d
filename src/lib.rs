//! # Safar - tour sales assistant
//!
//! Safar answers customers of a tour operator on behalf of a human-sounding
//! consultant. An LLM agent with function calling searches a tours catalogue,
//! suggests destinations, formats offers and records customers who are ready
//! to book. The same consultant serves three front-ends: a helpdesk webhook
//! (Instagram, WhatsApp and Telegram inboxes), a Telegram bot and a small web
//! dashboard.
//!
//! ## Quick Start
//!
//! ```no_run
//! use safar::catalog::TurtoparClient;
//! use safar::config::Settings;
//! use safar::consultant::TourConsultant;
//! use safar::conversation::{ConversationKey, SenderInfo};
//! use safar::leads::InMemoryLeadBook;
//! use safar::OpenAIProvider;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::default();
//! let provider = OpenAIProvider::new(std::env::var("OPENAI_API_KEY")?);
//! let consultant = TourConsultant::build(
//!     &settings,
//!     Box::new(provider),
//!     Arc::new(TurtoparClient::new(settings.catalog.base_url.clone())),
//!     Arc::new(InMemoryLeadBook::new()),
//! )
//! .await?;
//!
//! let key = ConversationKey::dashboard("demo");
//! let reply = consultant
//!     .reply(&key, "Dubayga 7 kunlik tur bormi?", &SenderInfo::default(), None)
//!     .await?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```
//!
//! ## Tour search without the agent
//!
//! ```no_run
//! use safar::catalog::TurtoparClient;
//! use safar::location::LocationCache;
//! use safar::search::{SearchRequest, TourSearch};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let catalog = Arc::new(TurtoparClient::new("https://api.turtopar.uz/api/v1"));
//! let search = TourSearch::new(Arc::new(LocationCache::new(catalog)));
//!
//! let outcome = search.search(&SearchRequest::to("Antaliya").budget(900.0)).await;
//! println!("{}: {}", outcome.count, outcome.message);
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐ ┌───────────────┐ ┌───────────────┐
//! │   Chatwoot    │ │   Telegram    │ │   Dashboard   │
//! └───────┬───────┘ └───────┬───────┘ └───────┬───────┘
//!         └─────────────────┼─────────────────┘
//!                 ┌─────────┴─────────┐
//!                 │  TourConsultant   │  conversation registry
//!                 └─────────┬─────────┘
//!                 ┌─────────┴─────────┐
//!                 │       Agent       │  threads, tool loop
//!                 └────┬─────────┬────┘
//!            ┌─────────┘         └─────────┐
//!   ┌────────┴────────┐          ┌─────────┴────────┐
//!   │  LLM provider   │          │      Tools       │
//!   │  (OpenAI)       │          │  search, leads   │
//!   └─────────────────┘          └─────────┬────────┘
//!                                ┌─────────┴────────┐
//!                                │ TourSearch       │
//!                                │ LocationCache    │
//!                                │ TourCatalog      │
//!                                └──────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`agent`]: tool-calling agent over conversation threads
//! - [`tool`]: tool trait, parameter schemas and registry
//! - [`provider`]: LLM provider abstraction (OpenAI)
//! - [`catalog`]: tours API client and wire models
//! - [`location`]: transliteration and place resolution
//! - [`search`]: tour search with its fallback cascade
//! - [`tools`]: the consultant's tools
//! - [`consultant`]: front-end facing entry point
//! - [`channels`]: helpdesk webhook and Telegram bot
//! - [`server`]: HTTP routes and dashboard

// Core type definitions
pub mod types;

// Error types
pub mod error;

// Settings and logging
pub mod config;
pub mod logging;

// Conversation memory
pub mod context;
pub mod conversation;
pub mod storage;
pub mod thread;

// Agent core
pub mod agent;
pub mod prompt;
pub mod provider;
pub mod tool;

// Tours domain
pub mod catalog;
pub mod destinations;
pub mod format;
pub mod leads;
pub mod location;
pub mod search;
pub mod tools;

// Front-ends
pub mod channels;
pub mod consultant;
pub mod server;

pub use agent::{Agent, AgentBuilder, AgentConfig, AgentResponse, ToolExecution};
pub use context::{Context, Message, MessageRole, ToolCall};
pub use error::{AgentError, CatalogError, ChannelError, Result, StorageError};
pub use provider::{LLMProvider, OpenAIProvider, ProviderConfig};
pub use storage::{memory::InMemoryThreadStore, ThreadStore};
pub use thread::{Thread, ThreadStatus};
pub use tool::{ParameterSchema, Tool, ToolRegistry, ToolResult};
pub use types::*;
