//! The tour consultant shared by every front-end
//!
//! Front-ends hand over the customer's text with whatever they know about the
//! sender; the consultant maps the conversation to its agent thread, runs the
//! agent and keeps the conversation log and preferences current.

use crate::agent::{Agent, AgentConfig};
use crate::catalog::TourCatalog;
use crate::config::Settings;
use crate::context::MessageRole;
use crate::conversation::{
    contextual_message, extract_preferences, ConversationKey, ConversationRegistry, SenderInfo,
};
use crate::error::Result;
use crate::leads::LeadSink;
use crate::location::LocationCache;
use crate::prompt::ConsultantPrompt;
use crate::provider::LLMProvider;
use crate::search::TourSearch;
use crate::tool::ToolRegistry;
use crate::tools::{register_tour_tools, ToolDeps};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct TourConsultant {
    agent: Arc<Agent>,
    registry: ConversationRegistry,
    leads: Arc<dyn LeadSink>,
    search: Arc<TourSearch>,
}

impl TourConsultant {
    pub fn new(
        agent: Arc<Agent>,
        registry: ConversationRegistry,
        leads: Arc<dyn LeadSink>,
        search: Arc<TourSearch>,
    ) -> Self {
        Self {
            agent,
            registry,
            leads,
            search,
        }
    }

    /// Wire the agent, its tools and the catalogue according to `settings`
    pub async fn build(
        settings: &Settings,
        provider: Box<dyn LLMProvider>,
        catalog: Arc<dyn TourCatalog>,
        leads: Arc<dyn LeadSink>,
    ) -> Result<Self> {
        let search = Arc::new(TourSearch::new(Arc::new(LocationCache::new(catalog))));

        let tools = Arc::new(ToolRegistry::new());
        register_tour_tools(
            &tools,
            &ToolDeps {
                search: search.clone(),
                leads: leads.clone(),
                default_origin: settings.agent.default_origin.clone(),
            },
        )
        .await?;

        let agent = Agent::builder()
            .name(settings.agent.consultant_name.clone())
            .provider(provider)
            .tool_registry(tools)
            .prompt(ConsultantPrompt::new(
                settings.agent.consultant_name.clone(),
                settings.agent.default_origin.clone(),
            ))
            .config(AgentConfig {
                max_context_messages: settings.agent.max_context_messages,
                default_tool_timeout: Duration::from_secs(settings.agent.tool_timeout_secs),
                max_tool_rounds: settings.llm.max_tool_rounds,
            })
            .build()?;

        info!(consultant = %settings.agent.consultant_name, "Tour consultant ready");
        Ok(Self::new(Arc::new(agent), ConversationRegistry::new(), leads, search))
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    pub fn registry(&self) -> &ConversationRegistry {
        &self.registry
    }

    pub fn leads(&self) -> &Arc<dyn LeadSink> {
        &self.leads
    }

    pub fn search(&self) -> &Arc<TourSearch> {
        &self.search
    }

    /// Answer one customer message
    pub async fn reply(
        &self,
        key: &ConversationKey,
        text: &str,
        sender: &SenderInfo,
        platform: Option<&str>,
    ) -> Result<String> {
        let message = contextual_message(text, sender, platform);
        let thread_id = self.registry.get_or_create_thread_id(key).await;
        self.agent.ensure_thread(thread_id).await?;

        self.registry
            .add_message(key, MessageRole::User, text)
            .await;

        let response = self.agent.process_message(thread_id, message).await?;
        debug!(
            conversation = %key,
            rounds = response.rounds,
            tools = response.tools_used.len(),
            "Consultant replied"
        );

        self.registry
            .add_message(key, MessageRole::Assistant, response.message.clone())
            .await;

        if let Some(context) = self.registry.get(key).await {
            let preferences = extract_preferences(&context.user_texts());
            self.registry.update_preferences(key, preferences).await;
        }

        Ok(response.message)
    }

    /// Close the current thread and start a fresh consultation
    pub async fn reset(&self, key: &ConversationKey) -> Result<()> {
        if let Some(previous) = self.registry.get(key).await {
            if self.agent.get_thread(&previous.thread_id).await?.is_some() {
                self.agent.close_thread(&previous.thread_id).await?;
            }
        }
        self.registry.reset(key).await;
        Ok(())
    }
}
