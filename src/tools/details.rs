//! Tour detail lookup and formatting tools

use crate::catalog::{Tour, TourCatalog, TourDetails};
use crate::error::{AgentError, Result};
use crate::format::format_tour;
use crate::tool::{ParameterSchema, Tool, ToolResult};
use crate::tools::string_param;
use crate::types::ToolId;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// `get_tour_details`: full record of one tour by slug
pub struct GetTourDetailsTool {
    id: ToolId,
    parameters: HashMap<String, ParameterSchema>,
    catalog: Arc<dyn TourCatalog>,
}

impl GetTourDetailsTool {
    pub fn new(catalog: Arc<dyn TourCatalog>) -> Self {
        let mut parameters = HashMap::new();
        parameters.insert(
            "tour_slug".to_string(),
            ParameterSchema::required("string", "Tour slug from search results"),
        );
        Self {
            id: ToolId::new(),
            parameters,
            catalog,
        }
    }
}

#[async_trait]
impl Tool for GetTourDetailsTool {
    fn id(&self) -> &ToolId {
        &self.id
    }

    fn name(&self) -> &str {
        "get_tour_details"
    }

    fn description(&self) -> &str {
        "Get hotels, schedule, pricing and contact details of a tour by its slug."
    }

    fn parameters(&self) -> &HashMap<String, ParameterSchema> {
        &self.parameters
    }

    async fn execute(&self, parameters: HashMap<String, Value>) -> Result<ToolResult> {
        let slug = string_param(&parameters, "tour_slug").ok_or_else(|| {
            AgentError::InvalidToolParameters {
                tool_name: self.name().to_string(),
                reason: "tour_slug must be a non-empty string".to_string(),
            }
        })?;

        match self.catalog.tour_details(&slug).await {
            Ok(raw) => {
                let details = TourDetails::from_json(&raw);
                info!(slug = %slug, hotels = details.hotels.len(), "Tour details fetched");
                let mut output = serde_json::to_value(&details)?;
                output["status"] = json!("success");
                Ok(ToolResult::success(output))
            }
            Err(e) => {
                warn!(slug = %slug, error = %e, "Tour details lookup failed");
                let message = format!("Error fetching tour details: {}", e);
                Ok(ToolResult::failure(
                    json!({
                        "status": "error",
                        "message": message,
                        "tour_details": {},
                    }),
                    message,
                ))
            }
        }
    }
}

/// `format_tour_details`: render a tour record as a readable card
pub struct FormatTourDetailsTool {
    id: ToolId,
    parameters: HashMap<String, ParameterSchema>,
}

impl FormatTourDetailsTool {
    pub fn new() -> Self {
        let mut parameters = HashMap::new();
        parameters.insert(
            "tour_data".to_string(),
            ParameterSchema::required("object", "A tour object from search results"),
        );
        Self {
            id: ToolId::new(),
            parameters,
        }
    }
}

impl Default for FormatTourDetailsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FormatTourDetailsTool {
    fn id(&self) -> &ToolId {
        &self.id
    }

    fn name(&self) -> &str {
        "format_tour_details"
    }

    fn description(&self) -> &str {
        "Format tour information for easy reading."
    }

    fn parameters(&self) -> &HashMap<String, ParameterSchema> {
        &self.parameters
    }

    async fn execute(&self, mut parameters: HashMap<String, Value>) -> Result<ToolResult> {
        let data = parameters.remove("tour_data").unwrap_or(Value::Null);
        Ok(ToolResult::success(Value::String(format_tour(&Tour::from_json(data)))))
    }
}
