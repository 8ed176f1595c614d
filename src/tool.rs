//! Tool integration for external API and function calls
//!
//! This module implements the tool system that lets the consultant agent call
//! the tours catalogue, lead capture and formatting helpers during a
//! conversation. Tools are exposed to the model as JSON-schema functions.

use crate::error::{AgentError, Result};
use crate::provider::FunctionSpec;
use crate::types::ToolId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

/// Parameter schema definition for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub param_type: String,
    pub required: bool,
    pub description: String,
    pub default: Option<Value>,
    /// Element type for `array` parameters
    #[serde(default)]
    pub item_type: Option<String>,
}

impl ParameterSchema {
    /// A required parameter
    pub fn required(param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            param_type: param_type.into(),
            required: true,
            description: description.into(),
            default: None,
            item_type: None,
        }
    }

    /// An optional parameter without a default
    pub fn optional(param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(param_type, description)
        }
    }

    /// Set the default value, making the parameter optional
    pub fn with_default(mut self, default: Value) -> Self {
        self.required = false;
        self.default = Some(default);
        self
    }

    /// Set the array element type
    pub fn with_items(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!(self.param_type));
        schema.insert("description".to_string(), json!(self.description));
        if let Some(item_type) = &self.item_type {
            schema.insert("items".to_string(), json!({ "type": item_type }));
        }
        if let Some(default) = &self.default {
            schema.insert("default".to_string(), default.clone());
        }
        Value::Object(schema)
    }
}

/// Result of tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub output: Value,
    pub error: Option<String>,
    pub metadata: HashMap<String, Value>,
}

impl ToolResult {
    /// Successful result carrying `output`
    pub fn success(output: Value) -> Self {
        Self {
            output,
            error: None,
            metadata: HashMap::new(),
        }
    }

    /// Result reporting a handled failure to the model
    pub fn failure(output: Value, error: impl Into<String>) -> Self {
        Self {
            output,
            error: Some(error.into()),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Trait for tools that can be executed by the agent
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique identifier for this tool
    fn id(&self) -> &ToolId;

    /// Function name exposed to the model
    fn name(&self) -> &str;

    /// Description of what this tool does
    fn description(&self) -> &str;

    /// Parameter schema for this tool
    fn parameters(&self) -> &HashMap<String, ParameterSchema>;

    /// Execute the tool with given parameters
    async fn execute(&self, parameters: HashMap<String, Value>) -> Result<ToolResult>;

    /// Validate parameters before execution
    fn validate_parameters(&self, parameters: &HashMap<String, Value>) -> Result<()> {
        trace!(tool_name = %self.name(), "Validating tool parameters");

        let schema = self.parameters();

        for (param_name, param_schema) in schema {
            if param_schema.required && !parameters.contains_key(param_name) {
                warn!(
                    tool_name = %self.name(),
                    param_name = %param_name,
                    "Missing required parameter"
                );
                return Err(AgentError::InvalidToolParameters {
                    tool_name: self.name().to_string(),
                    reason: format!("Missing required parameter: {}", param_name),
                });
            }
        }

        for (param_name, value) in parameters {
            if let Some(param_schema) = schema.get(param_name) {
                if !validate_type(value, &param_schema.param_type) {
                    warn!(
                        tool_name = %self.name(),
                        param_name = %param_name,
                        expected_type = %param_schema.param_type,
                        "Parameter type mismatch"
                    );
                    return Err(AgentError::InvalidToolParameters {
                        tool_name: self.name().to_string(),
                        reason: format!(
                            "Parameter '{}' has wrong type, expected {}",
                            param_name, param_schema.param_type
                        ),
                    });
                }
            }
        }

        debug!(
            tool_name = %self.name(),
            param_count = parameters.len(),
            "Parameter validation successful"
        );

        Ok(())
    }

    /// Apply default values to parameters
    fn apply_defaults(&self, parameters: &mut HashMap<String, Value>) {
        let schema = self.parameters();

        for (param_name, param_schema) in schema {
            if !parameters.contains_key(param_name) {
                if let Some(ref default_value) = param_schema.default {
                    trace!(
                        tool_name = %self.name(),
                        param_name = %param_name,
                        "Applying default parameter value"
                    );
                    parameters.insert(param_name.clone(), default_value.clone());
                }
            }
        }
    }

    /// Function definition offered to the model
    fn function_spec(&self) -> FunctionSpec {
        let schema = self.parameters();
        let mut names: Vec<&String> = schema.keys().collect();
        names.sort();

        let mut properties = Map::new();
        let mut required = Vec::new();
        for name in names {
            let param = &schema[name];
            properties.insert(name.clone(), param.to_json_schema());
            if param.required {
                required.push(json!(name));
            }
        }

        FunctionSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

/// Validate a JSON value against a type string.
///
/// Numeric types also take numeric strings and integers take fractions;
/// tools round and parse those themselves.
fn validate_type(value: &Value, expected_type: &str) -> bool {
    match expected_type {
        "string" => matches!(value, Value::String(_)),
        "number" | "integer" => crate::catalog::model::number(value).is_some(),
        "boolean" => matches!(value, Value::Bool(_)),
        "object" => matches!(value, Value::Object(_)),
        "array" => matches!(value, Value::Array(_)),
        "null" => matches!(value, Value::Null),
        _ => true,
    }
}

/// Registry for managing tools
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<ToolId, Arc<dyn Tool>>>>,
    tools_by_name: Arc<RwLock<HashMap<String, ToolId>>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        info!("Creating new tool registry");
        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
            tools_by_name: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a new tool
    pub async fn register(&self, tool: Box<dyn Tool>) -> Result<ToolId> {
        let tool_id = *tool.id();
        let tool_name = tool.name().to_string();

        info!(
            tool_id = %tool_id,
            tool_name = %tool_name,
            "Registering tool"
        );

        let mut tools = self.tools.write().await;
        let mut tools_by_name = self.tools_by_name.write().await;

        if tools_by_name.contains_key(&tool_name) {
            warn!(
                tool_name = %tool_name,
                "Attempted to register duplicate tool"
            );
            return Err(AgentError::ToolAlreadyRegistered(tool_name));
        }

        tools.insert(tool_id, Arc::from(tool));
        tools_by_name.insert(tool_name.clone(), tool_id);

        debug!(
            tool_id = %tool_id,
            tool_name = %tool_name,
            total_tools = tools.len(),
            "Tool registered successfully"
        );

        Ok(tool_id)
    }

    /// Unregister a tool by ID
    pub async fn unregister(&self, tool_id: &ToolId) -> Result<()> {
        info!(tool_id = %tool_id, "Unregistering tool");

        let mut tools = self.tools.write().await;
        let mut tools_by_name = self.tools_by_name.write().await;

        if let Some(tool) = tools.remove(tool_id) {
            let tool_name = tool.name().to_string();
            tools_by_name.remove(&tool_name);

            debug!(
                tool_id = %tool_id,
                tool_name = %tool_name,
                remaining_tools = tools.len(),
                "Tool unregistered successfully"
            );

            Ok(())
        } else {
            warn!(tool_id = %tool_id, "Attempted to unregister unknown tool");
            Err(AgentError::ToolNotFound(tool_id.to_string()))
        }
    }

    /// Get a tool by ID
    pub async fn get(&self, tool_id: &ToolId) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(tool_id).cloned()
    }

    /// Get a tool by name
    pub async fn get_by_name(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools_by_name = self.tools_by_name.read().await;
        let tool_id = tools_by_name.get(name)?;

        let tools = self.tools.read().await;
        tools.get(tool_id).cloned()
    }

    /// List all registered tools
    pub async fn list(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.values().cloned().collect()
    }

    /// Number of registered tools
    pub async fn len(&self) -> usize {
        self.tools.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tools.read().await.is_empty()
    }

    /// Function definitions of every registered tool, sorted by name
    pub async fn function_specs(&self) -> Vec<FunctionSpec> {
        let mut specs: Vec<FunctionSpec> = self
            .list()
            .await
            .iter()
            .map(|tool| tool.function_spec())
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Execute a tool by ID with parameters
    pub async fn execute(
        &self,
        tool_id: &ToolId,
        parameters: HashMap<String, Value>,
    ) -> Result<ToolResult> {
        let tool = self
            .get(tool_id)
            .await
            .ok_or_else(|| AgentError::ToolNotFound(tool_id.to_string()))?;

        run_tool(tool.as_ref(), parameters).await
    }

    /// Execute a tool by its function name
    pub async fn execute_by_name(
        &self,
        name: &str,
        parameters: HashMap<String, Value>,
    ) -> Result<ToolResult> {
        let tool = self
            .get_by_name(name)
            .await
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;

        run_tool(tool.as_ref(), parameters).await
    }

    /// Execute a tool by name with a timeout
    pub async fn execute_with_timeout(
        &self,
        name: &str,
        parameters: HashMap<String, Value>,
        timeout_duration: Duration,
    ) -> Result<ToolResult> {
        trace!(
            tool_name = %name,
            timeout_secs = timeout_duration.as_secs(),
            "Executing tool with timeout"
        );

        match timeout(timeout_duration, self.execute_by_name(name, parameters)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    tool_name = %name,
                    timeout_secs = timeout_duration.as_secs(),
                    "Tool execution timed out"
                );

                Err(AgentError::ToolTimeout {
                    tool_name: name.to_string(),
                    timeout: timeout_duration,
                })
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_tool(tool: &dyn Tool, mut parameters: HashMap<String, Value>) -> Result<ToolResult> {
    info!(
        tool_name = %tool.name(),
        param_count = parameters.len(),
        "Executing tool"
    );

    // Models send explicit nulls for optional arguments they want to skip.
    parameters.retain(|_, value| !value.is_null());

    tool.apply_defaults(&mut parameters);
    tool.validate_parameters(&parameters)?;

    let result = tool.execute(parameters).await?;

    debug!(
        tool_name = %tool.name(),
        has_error = result.error.is_some(),
        "Tool execution completed"
    );

    Ok(result)
}
