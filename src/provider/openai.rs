//! OpenAI LLM provider implementation
//!
//! This module implements the LLMProvider trait for OpenAI chat models with
//! function calling.

use crate::context::{Message, MessageRole, ToolCall};
use crate::error::AgentError;
use crate::provider::{Completion, FunctionSpec, LLMProvider, ProviderConfig};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
        CreateChatCompletionRequestArgs, FunctionCall, FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, info, trace, warn};

/// OpenAI LLM provider
pub struct OpenAIProvider {
    client: Client<OpenAIConfig>,
    config: ProviderConfig,
}

fn build_error(e: OpenAIError) -> AgentError {
    AgentError::Provider(format!("Failed to build request: {}", e))
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with the given API key (model gpt-4o-mini)
    pub fn new(api_key: impl Into<String>) -> Self {
        let openai_config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(openai_config);

        Self {
            client,
            config: ProviderConfig::new("gpt-4o-mini"),
        }
    }

    /// Create a new OpenAI provider from environment variable OPENAI_API_KEY
    pub fn from_env() -> Result<Self, AgentError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            AgentError::Configuration("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self::new(api_key))
    }

    /// Point the client at an OpenAI-compatible endpoint
    pub fn with_api_base(mut self, api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        self.client = Client::with_config(openai_config);
        self
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.config = self.config.with_temperature(temperature);
        self
    }

    /// Set the maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.config = self.config.with_max_tokens(max_tokens);
        self
    }

    /// Convert Safar messages to OpenAI format
    fn convert_messages(
        &self,
        messages: Vec<Message>,
    ) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        messages
            .into_iter()
            .map(|m| -> Result<ChatCompletionRequestMessage, AgentError> {
                let converted = match m.role {
                    MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
                        .content(m.content)
                        .build()
                        .map_err(build_error)?
                        .into(),
                    MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
                        .content(m.content)
                        .build()
                        .map_err(build_error)?
                        .into(),
                    MessageRole::Assistant => {
                        let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
                        if !m.content.is_empty() {
                            builder.content(m.content);
                        }
                        if !m.tool_calls.is_empty() {
                            builder.tool_calls(
                                m.tool_calls
                                    .into_iter()
                                    .map(|call| ChatCompletionMessageToolCall {
                                        id: call.id,
                                        r#type: ChatCompletionToolType::Function,
                                        function: FunctionCall {
                                            name: call.name,
                                            arguments: call.arguments,
                                        },
                                    })
                                    .collect::<Vec<_>>(),
                            );
                        }
                        builder.build().map_err(build_error)?.into()
                    }
                    MessageRole::Tool => ChatCompletionRequestToolMessageArgs::default()
                        .content(m.content)
                        .tool_call_id(m.tool_call_id.unwrap_or_default())
                        .build()
                        .map_err(build_error)?
                        .into(),
                };
                Ok(converted)
            })
            .collect()
    }

    fn convert_functions(
        &self,
        functions: &[FunctionSpec],
    ) -> Result<Vec<ChatCompletionTool>, AgentError> {
        functions
            .iter()
            .map(|f| {
                let function = FunctionObjectArgs::default()
                    .name(f.name.clone())
                    .description(f.description.clone())
                    .parameters(f.parameters.clone())
                    .build()
                    .map_err(build_error)?;

                ChatCompletionToolArgs::default()
                    .r#type(ChatCompletionToolType::Function)
                    .function(function)
                    .build()
                    .map_err(build_error)
            })
            .collect()
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        functions: &[FunctionSpec],
    ) -> std::result::Result<Completion, AgentError> {
        info!(
            model = %self.config.model,
            message_count = messages.len(),
            function_count = functions.len(),
            "Requesting OpenAI completion"
        );

        let openai_messages = self.convert_messages(messages)?;

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder
            .model(&self.config.model)
            .messages(openai_messages)
            .temperature(self.config.temperature);

        if !functions.is_empty() {
            request_builder.tools(self.convert_functions(functions)?);
        }

        if let Some(max_tokens) = self.config.max_tokens {
            #[allow(deprecated)]
            request_builder.max_tokens(max_tokens);
        }

        if let Some(top_p) = self.config.top_p {
            request_builder.top_p(top_p);
        }

        let request = request_builder.build().map_err(build_error)?;

        trace!("Sending request to OpenAI");

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!(error = %e, "OpenAI API error");
            AgentError::Provider(format!("OpenAI API error: {}", e))
        })?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| {
                warn!("No choices in OpenAI response");
                AgentError::Provider("No choices in OpenAI response".to_string())
            })?;

        let tool_calls: Vec<ToolCall> = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall::new(call.id, call.function.name, call.function.arguments))
            .collect();

        debug!(
            response_length = message.content.as_deref().map(str::len).unwrap_or(0),
            tool_calls = tool_calls.len(),
            "OpenAI completion successful"
        );

        Ok(Completion {
            content: message.content,
            tool_calls,
        })
    }

    fn name(&self) -> &str {
        "OpenAI"
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_openai_provider_creation() {
        let provider = OpenAIProvider::new("test-api-key");
        assert_eq!(provider.name(), "OpenAI");
        assert_eq!(provider.config().model, "gpt-4o-mini");
        assert_eq!(provider.config().temperature, 0.3);
    }

    #[test]
    fn test_openai_provider_builders() {
        let provider = OpenAIProvider::new("test-api-key")
            .with_model("gpt-4o")
            .with_temperature(0.5)
            .with_max_tokens(1000);
        assert_eq!(provider.config().model, "gpt-4o");
        assert_eq!(provider.config().temperature, 0.5);
        assert_eq!(provider.config().max_tokens, Some(1000));
    }

    #[test]
    fn test_message_conversion_with_tool_round() {
        let provider = OpenAIProvider::new("test-api-key");
        let messages = vec![
            Message::system("You are a travel consultant"),
            Message::user("Dubayga tur bormi?"),
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCall::new(
                    "call_1",
                    "search_tours",
                    r#"{"destination_place":"Dubay"}"#,
                )],
            ),
            Message::tool_result("call_1", r#"{"count":3}"#),
            Message::assistant("3 ta tur topildi."),
        ];

        let converted = provider.convert_messages(messages).unwrap();
        assert_eq!(converted.len(), 5);
        assert!(matches!(converted[2], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(converted[3], ChatCompletionRequestMessage::Tool(_)));
    }

    #[test]
    fn test_function_conversion() {
        let provider = OpenAIProvider::new("test-api-key");
        let specs = vec![FunctionSpec {
            name: "get_popular_destinations".to_string(),
            description: "List popular destinations".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        }];

        let tools = provider.convert_functions(&specs).unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].function.name, "get_popular_destinations");
    }
}
