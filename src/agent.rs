// Agent core implementation
//
// This module implements the Agent that runs the tool-calling loop: the model
// sees the system prompt, the thread history and the registered tools, may ask
// for tool calls any number of rounds, and finally answers in text.

use crate::context::{Message, ToolCall};
use crate::error::{AgentError, Result};
use crate::prompt::SystemPrompt;
use crate::provider::{FunctionSpec, LLMProvider};
use crate::storage::memory::InMemoryThreadStore;
use crate::storage::ThreadStore;
use crate::thread::Thread;
use crate::tool::{Tool, ToolRegistry, ToolResult};
use crate::types::{ThreadId, ToolId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Sent to the model after a turn that produced neither text nor tool calls
pub const EMPTY_REPLY_NUDGE: &str = "Respond with a real output.";

const TOOL_ARG_PREVIEW_CHARS: usize = 100;

/// Agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// History window replayed to the model
    #[serde(default = "default_max_context_messages")]
    pub max_context_messages: usize,

    #[serde(
        default = "default_tool_timeout",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub default_tool_timeout: Duration,

    /// Model calls allowed per user message
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
}

fn default_max_context_messages() -> usize {
    100
}

fn default_tool_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_tool_rounds() -> usize {
    8
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_secs())
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_context_messages: default_max_context_messages(),
            default_tool_timeout: default_tool_timeout(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

/// Response from agent processing a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub message: String,
    pub tools_used: Vec<ToolExecution>,
    /// Model calls spent on this message
    pub rounds: usize,
}

/// Tool execution record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecution {
    pub name: String,
    pub duration: Duration,
    pub success: bool,
}

/// Tool-calling conversational agent.
///
/// The agent keeps one [`Thread`] per conversation in its [`ThreadStore`] and
/// replays the windowed history to the [`LLMProvider`] on every round.
///
/// # Examples
///
/// ```no_run
/// use safar::{Agent, OpenAIProvider};
///
/// # #[tokio::main]
/// # async fn main() -> safar::Result<()> {
/// let agent = Agent::builder()
///     .name("Aziza")
///     .provider(Box::new(OpenAIProvider::from_env()?))
///     .build()?;
///
/// let thread_id = agent.create_thread().await?;
/// let response = agent.process_message(thread_id, "Dubayga tur bormi?").await?;
/// println!("{}", response.message);
/// # Ok(())
/// # }
/// ```
pub struct Agent {
    name: String,
    provider: Box<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    thread_store: Arc<dyn ThreadStore>,
    prompt: SystemPrompt,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent builder
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Registry of tools offered to the model
    pub fn tool_registry(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Start a new conversation thread
    pub async fn create_thread(&self) -> Result<ThreadId> {
        let thread_id = self.thread_store.create(Thread::new()).await?;
        debug!(thread_id = %thread_id, "Thread created");
        Ok(thread_id)
    }

    /// Create the thread under `thread_id` unless it already exists
    pub async fn ensure_thread(&self, thread_id: ThreadId) -> Result<()> {
        if !self.thread_store.exists(&thread_id).await? {
            self.thread_store.create(Thread::with_id(thread_id)).await?;
            debug!(thread_id = %thread_id, "Thread created on first message");
        }
        Ok(())
    }

    /// Get a thread by ID
    pub async fn get_thread(&self, thread_id: &ThreadId) -> Result<Option<Thread>> {
        Ok(self.thread_store.get(thread_id).await?)
    }

    /// Close a thread; further messages are rejected
    pub async fn close_thread(&self, thread_id: &ThreadId) -> Result<()> {
        let mut thread = self
            .thread_store
            .get(thread_id)
            .await?
            .ok_or(AgentError::ThreadNotFound(*thread_id))?;

        thread.close();
        self.thread_store.update(thread_id, thread).await?;
        Ok(())
    }

    /// Add a tool to the agent
    pub async fn add_tool(&self, tool: Box<dyn Tool>) -> Result<ToolId> {
        info!(
            agent = %self.name,
            tool_name = tool.name(),
            "Adding tool to agent"
        );

        self.tool_registry.register(tool).await
    }

    /// Process a user message and generate a response
    pub async fn process_message(
        &self,
        thread_id: ThreadId,
        user_message: impl Into<String>,
    ) -> Result<AgentResponse> {
        let user_message = user_message.into();
        info!(
            thread_id = %thread_id,
            message_length = user_message.len(),
            "Processing user message"
        );

        let mut thread = self
            .thread_store
            .get(&thread_id)
            .await?
            .ok_or(AgentError::ThreadNotFound(thread_id))?;

        if !thread.is_active() {
            return Err(AgentError::InvalidInput(format!(
                "Thread {} is closed",
                thread_id
            )));
        }

        thread.context.add_message(Message::user(user_message));

        let functions = self.tool_registry.function_specs().await;
        let mut tools_used = Vec::new();
        let mut nudge = false;

        for round in 1..=self.config.max_tool_rounds {
            let messages = self.build_llm_messages(&thread, nudge);
            let completion = self.complete(messages, &functions).await?;

            if !completion.tool_calls.is_empty() {
                debug!(
                    round,
                    tool_calls = completion.tool_calls.len(),
                    "Model requested tools"
                );

                thread.context.add_message(Message::assistant_with_tool_calls(
                    completion.content.clone().unwrap_or_default(),
                    completion.tool_calls.clone(),
                ));

                for call in &completion.tool_calls {
                    let (content, execution) = self.run_tool_call(call).await;
                    tools_used.push(execution);
                    thread
                        .context
                        .add_message(Message::tool_result(call.id.clone(), content));
                }

                nudge = false;
                continue;
            }

            match completion.content.filter(|c| !c.trim().is_empty()) {
                Some(text) => {
                    thread.context.add_message(Message::assistant(text.clone()));
                    thread.touch();
                    self.thread_store.update(&thread_id, thread).await?;

                    info!(
                        thread_id = %thread_id,
                        rounds = round,
                        tools_used = tools_used.len(),
                        "Reply generated"
                    );

                    return Ok(AgentResponse {
                        message: text,
                        tools_used,
                        rounds: round,
                    });
                }
                None => {
                    warn!(thread_id = %thread_id, round, "Empty model reply, re-prompting");
                    nudge = true;
                }
            }
        }

        // Keep the tool results gathered so far for the next message.
        thread.touch();
        self.thread_store.update(&thread_id, thread).await?;

        warn!(
            thread_id = %thread_id,
            rounds = self.config.max_tool_rounds,
            "Tool loop exhausted"
        );
        Err(AgentError::ToolLoopExhausted {
            rounds: self.config.max_tool_rounds,
        })
    }

    async fn complete(
        &self,
        messages: Vec<Message>,
        functions: &[FunctionSpec],
    ) -> Result<crate::provider::Completion> {
        trace!(
            provider = %self.provider.name(),
            message_count = messages.len(),
            "Calling provider"
        );
        self.provider.complete(messages, functions).await
    }

    /// Run one requested call; failures become an explanatory tool message
    async fn run_tool_call(&self, call: &ToolCall) -> (String, ToolExecution) {
        let started = Instant::now();

        let outcome = match parse_arguments(call) {
            Ok(arguments) => {
                log_tool_call(&call.name, &arguments);
                self.tool_registry
                    .execute_with_timeout(&call.name, arguments, self.config.default_tool_timeout)
                    .await
            }
            Err(e) => Err(e),
        };

        let (content, success) = match outcome {
            Ok(result) => (tool_result_content(&result), result.error.is_none()),
            Err(e) => {
                warn!(tool_name = %call.name, error = %e, "Tool call failed");
                (tool_error_message(&e), false)
            }
        };

        let execution = ToolExecution {
            name: call.name.clone(),
            duration: started.elapsed(),
            success,
        };

        debug!(
            tool_name = %execution.name,
            duration_ms = execution.duration.as_millis() as u64,
            success,
            "Tool call finished"
        );

        (content, execution)
    }

    /// Build LLM messages from the thread history
    fn build_llm_messages(&self, thread: &Thread, nudge: bool) -> Vec<Message> {
        let window = thread.context.window(self.config.max_context_messages);

        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(Message::system(self.prompt.render(Utc::now())));
        messages.extend(window.iter().cloned());
        if nudge {
            messages.push(Message::user(EMPTY_REPLY_NUDGE));
        }
        messages
    }
}

fn parse_arguments(call: &ToolCall) -> Result<HashMap<String, Value>> {
    if call.arguments.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(&call.arguments).map_err(|e| AgentError::InvalidToolParameters {
        tool_name: call.name.clone(),
        reason: format!("arguments are not a JSON object: {}", e),
    })
}

fn tool_result_content(result: &ToolResult) -> String {
    match (&result.error, &result.output) {
        (Some(error), Value::Null) => error.clone(),
        (_, Value::String(text)) => text.clone(),
        _ => result.output.to_string(),
    }
}

/// Tool message the model sees when a call fails
pub fn tool_error_message(error: &AgentError) -> String {
    format!(
        "I encountered an issue: {}\nLet me try to help you in a different way. Please provide more details about what you're looking for.",
        error
    )
}

fn log_tool_call(name: &str, arguments: &HashMap<String, Value>) {
    let mut keys: Vec<&String> = arguments.keys().collect();
    keys.sort();

    let rendered = keys
        .into_iter()
        .map(|key| format!("{}: {}", key, preview(&arguments[key])))
        .collect::<Vec<_>>()
        .join(", ");

    info!(tool_name = %name, arguments = %rendered, "Tool called");
}

fn preview(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > TOOL_ARG_PREVIEW_CHARS {
        let cut: String = text.chars().take(TOOL_ARG_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        text
    }
}

/// Builder for Agent
pub struct AgentBuilder {
    name: Option<String>,
    provider: Option<Box<dyn LLMProvider>>,
    config: AgentConfig,
    thread_store: Option<Arc<dyn ThreadStore>>,
    tool_registry: Option<Arc<ToolRegistry>>,
    prompt: SystemPrompt,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            provider: None,
            config: AgentConfig::default(),
            thread_store: None,
            tool_registry: None,
            prompt: SystemPrompt::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Box<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn thread_store(mut self, store: Arc<dyn ThreadStore>) -> Self {
        self.thread_store = Some(store);
        self
    }

    /// Share an already populated registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = Some(registry);
        self
    }

    pub fn prompt(mut self, prompt: impl Into<SystemPrompt>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn build(self) -> Result<Agent> {
        let name = self
            .name
            .ok_or_else(|| AgentError::Configuration("Agent name is required".to_string()))?;

        let provider = self
            .provider
            .ok_or_else(|| AgentError::Configuration("LLM provider is required".to_string()))?;

        if self.config.max_tool_rounds == 0 {
            return Err(AgentError::Configuration(
                "max_tool_rounds must be at least 1".to_string(),
            ));
        }

        let thread_store = self
            .thread_store
            .unwrap_or_else(|| Arc::new(InMemoryThreadStore::new()));

        Ok(Agent {
            name,
            provider,
            tool_registry: self.tool_registry.unwrap_or_default(),
            thread_store,
            prompt: self.prompt,
            config: self.config,
        })
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
