//! Tour and location search tools

use crate::error::Result;
use crate::location::{LocationCache, LocationIndex, LocationScope};
use crate::search::{SearchRequest, SearchStatus, TourSearch};
use crate::tool::{ParameterSchema, Tool, ToolResult};
use crate::tools::{integer_param, number_param, string_param};
use crate::types::ToolId;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Suggestions offered when a place name is unknown
pub const MAX_SUGGESTIONS: usize = 8;

/// `search_tours`: catalogue search with the destination fallback cascade
pub struct SearchToursTool {
    id: ToolId,
    parameters: HashMap<String, ParameterSchema>,
    search: Arc<TourSearch>,
}

impl SearchToursTool {
    pub fn new(search: Arc<TourSearch>) -> Self {
        let mut parameters = HashMap::new();
        parameters.insert(
            "origin_city".to_string(),
            ParameterSchema::optional("string", "Departure city, e.g. Toshkent"),
        );
        parameters.insert(
            "destination_place".to_string(),
            ParameterSchema::optional("string", "Destination country or city as the customer named it"),
        );
        parameters.insert(
            "departure_date".to_string(),
            ParameterSchema::optional("string", "Departure date in DD.MM.YYYY format, only if the customer gave one"),
        );
        parameters.insert(
            "budget_max".to_string(),
            ParameterSchema::optional("number", "Maximum price in USD, only if the customer stated a budget"),
        );
        parameters.insert(
            "duration_days".to_string(),
            ParameterSchema::optional("integer", "Trip length in days, only if the customer stated one"),
        );
        parameters.insert(
            "sort_by".to_string(),
            ParameterSchema::optional("string", "price_asc, price_desc, date_asc or date_desc")
                .with_default(json!("price_asc")),
        );

        Self {
            id: ToolId::new(),
            parameters,
            search,
        }
    }
}

#[async_trait]
impl Tool for SearchToursTool {
    fn id(&self) -> &ToolId {
        &self.id
    }

    fn name(&self) -> &str {
        "search_tours"
    }

    fn description(&self) -> &str {
        "Search available tours. When the destination has no tours, nearby places \
         are searched automatically and the result says where tours were found."
    }

    fn parameters(&self) -> &HashMap<String, ParameterSchema> {
        &self.parameters
    }

    async fn execute(&self, parameters: HashMap<String, Value>) -> Result<ToolResult> {
        let request = SearchRequest {
            origin_city: string_param(&parameters, "origin_city"),
            destination: string_param(&parameters, "destination_place"),
            departure_date: string_param(&parameters, "departure_date"),
            budget_max: number_param(&parameters, "budget_max"),
            duration_days: integer_param(&parameters, "duration_days"),
            sort_by: string_param(&parameters, "sort_by").unwrap_or_else(|| "price_asc".to_string()),
        };

        let outcome = self.search.search(&request).await;
        let mut output = serde_json::to_value(&outcome)?;
        output["search_params"] = serde_json::to_value(&request)?;

        Ok(match outcome.status {
            SearchStatus::Error => ToolResult::failure(output, outcome.message),
            _ => ToolResult::success(output).with_metadata("stage", json!(outcome.stage)),
        })
    }
}

/// `search_locations`: resolve a place name to a catalogue location
pub struct SearchLocationsTool {
    id: ToolId,
    parameters: HashMap<String, ParameterSchema>,
    locations: Arc<LocationCache>,
}

impl SearchLocationsTool {
    pub fn new(locations: Arc<LocationCache>) -> Self {
        let mut parameters = HashMap::new();
        parameters.insert(
            "query".to_string(),
            ParameterSchema::required("string", "Place name to look up"),
        );
        parameters.insert(
            "location_type".to_string(),
            ParameterSchema::optional(
                "string",
                "\"origin\" for departure cities or \"destination\" for travel destinations",
            )
            .with_default(json!("destination")),
        );

        Self {
            id: ToolId::new(),
            parameters,
            locations,
        }
    }
}

#[async_trait]
impl Tool for SearchLocationsTool {
    fn id(&self) -> &ToolId {
        &self.id
    }

    fn name(&self) -> &str {
        "search_locations"
    }

    fn description(&self) -> &str {
        "Look up a country or city by name in any spelling (Uzbek, English or Russian)."
    }

    fn parameters(&self) -> &HashMap<String, ParameterSchema> {
        &self.parameters
    }

    async fn execute(&self, parameters: HashMap<String, Value>) -> Result<ToolResult> {
        let query = string_param(&parameters, "query").unwrap_or_default();
        let scope = string_param(&parameters, "location_type")
            .map(|t| LocationScope::parse(&t))
            .unwrap_or(LocationScope::Destination);

        let index = match self.locations.index(scope).await {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "Location lookup unavailable");
                let message = format!("Location search error: {}", e);
                return Ok(ToolResult::failure(
                    json!({"status": "error", "message": message}),
                    message,
                ));
            }
        };

        if let Some(found) = index.resolve(&query) {
            let record = found.record;
            let country = record.country().unwrap_or_default().to_string();
            let message = if country.is_empty() {
                format!("Found {}", record.name)
            } else {
                format!("Found {} in {}", record.name, country)
            };
            return Ok(ToolResult::success(json!({
                "status": "found",
                "location": {
                    "id": record.id,
                    "name": record.name,
                    "type": record.kind,
                    "country": country,
                },
                "match": found.kind,
                "message": message,
            })));
        }

        let suggestions = suggestions(&index, scope);
        Ok(ToolResult::success(json!({
            "status": "not_found",
            "message": format!(
                "Could not find '{}'. Popular destinations include: {}",
                query,
                suggestions.join(", ")
            ),
            "suggestions": suggestions,
        })))
    }
}

/// First five countries with two cities each, or the first six origins
pub fn suggestions(index: &LocationIndex, scope: LocationScope) -> Vec<String> {
    let names: Vec<String> = match scope {
        LocationScope::Destination => index
            .countries()
            .take(5)
            .flat_map(|country| {
                std::iter::once(country.name.clone()).chain(
                    index
                        .children_of(country.id)
                        .into_iter()
                        .take(2)
                        .map(|city| city.name.clone()),
                )
            })
            .collect(),
        LocationScope::Origin => index.records().iter().take(6).map(|r| r.name.clone()).collect(),
    };
    names.into_iter().take(MAX_SUGGESTIONS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LocationNode;

    #[test]
    fn test_destination_suggestions_capped() {
        let countries: Vec<LocationNode> = (1..=6)
            .map(|c| {
                LocationNode::new(c, format!("Country{}", c)).with_children(vec![
                    LocationNode::new(c * 10 + 1, format!("City{}a", c)),
                    LocationNode::new(c * 10 + 2, format!("City{}b", c)),
                    LocationNode::new(c * 10 + 3, format!("City{}c", c)),
                ])
            })
            .collect();
        let index = LocationIndex::destinations(&countries);

        let names = suggestions(&index, LocationScope::Destination);
        assert_eq!(names.len(), MAX_SUGGESTIONS);
        assert_eq!(
            &names[..4],
            &["Country1", "City1a", "City1b", "Country2"]
        );
        assert!(!names.iter().any(|n| n.ends_with('c')));
    }

    #[test]
    fn test_origin_suggestions() {
        let cities: Vec<LocationNode> = (1..=9)
            .map(|c| LocationNode::new(c, format!("Origin{}", c)))
            .collect();
        let index = LocationIndex::origins(&cities);
        let names = suggestions(&index, LocationScope::Origin);
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], "Origin1");
    }
}
