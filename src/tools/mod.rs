//! Tools the consultant agent calls
//!
//! Every tool answers with a JSON object carrying a `status` field so the model
//! can tell found, empty and failed lookups apart. Catalogue failures are
//! reported in that object rather than as errors, keeping the turn alive.

use crate::error::Result;
use crate::leads::LeadSink;
use crate::search::TourSearch;
use crate::tool::{Tool, ToolRegistry};
use crate::types::ToolId;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub mod details;
pub mod inquiry;
pub mod recommend;
pub mod search;

pub use details::{FormatTourDetailsTool, GetTourDetailsTool};
pub use inquiry::CollectCustomerInquiryTool;
pub use recommend::{GetPopularDestinationsTool, GetTourRecommendationsTool};
pub use search::{SearchLocationsTool, SearchToursTool};

/// What the tour tools need
#[derive(Clone)]
pub struct ToolDeps {
    pub search: Arc<TourSearch>,
    pub leads: Arc<dyn LeadSink>,
    /// Departure city assumed when the customer names none
    pub default_origin: String,
}

/// Register the full tool set
pub async fn register_tour_tools(registry: &ToolRegistry, deps: &ToolDeps) -> Result<Vec<ToolId>> {
    let tools: Vec<Box<dyn Tool>> = vec![
        Box::new(SearchToursTool::new(deps.search.clone())),
        Box::new(SearchLocationsTool::new(deps.search.locations().clone())),
        Box::new(GetTourDetailsTool::new(deps.search.locations().catalog().clone())),
        Box::new(GetTourRecommendationsTool::new(
            deps.search.clone(),
            deps.default_origin.clone(),
        )),
        Box::new(GetPopularDestinationsTool::new()),
        Box::new(FormatTourDetailsTool::new()),
        Box::new(CollectCustomerInquiryTool::new(deps.leads.clone())),
    ];

    let mut ids = Vec::with_capacity(tools.len());
    for tool in tools {
        ids.push(registry.register(tool).await?);
    }
    info!(tools = ids.len(), "Tour tools registered");
    Ok(ids)
}

/// Non-empty trimmed string parameter
pub(crate) fn string_param(params: &HashMap<String, Value>, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn number_param(params: &HashMap<String, Value>, key: &str) -> Option<f64> {
    params.get(key).and_then(crate::catalog::model::number)
}

pub(crate) fn integer_param(params: &HashMap<String, Value>, key: &str) -> Option<i64> {
    number_param(params, key).map(|n| n.round() as i64)
}

/// String items of an array parameter
pub(crate) fn strings_param(params: &HashMap<String, Value>, key: &str) -> Vec<String> {
    params
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
