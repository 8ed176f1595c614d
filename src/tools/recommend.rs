//! Recommendation and destination catalogue tools

use crate::catalog::Tour;
use crate::destinations::{budget_band, places_for_interests, POPULAR_DESTINATIONS};
use crate::error::Result;
use crate::search::{merge_unique, sort_by_price, SearchRequest, TourSearch};
use crate::tool::{ParameterSchema, Tool, ToolResult};
use crate::tools::{string_param, strings_param};
use crate::types::ToolId;
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Places searched per recommendation
pub const MAX_RECOMMENDED_PLACES: usize = 5;

/// Tours returned per recommendation
pub const MAX_RECOMMENDATIONS: usize = 8;

/// `get_tour_recommendations`: tours for the customer's interests
pub struct GetTourRecommendationsTool {
    id: ToolId,
    parameters: HashMap<String, ParameterSchema>,
    search: Arc<TourSearch>,
}

impl GetTourRecommendationsTool {
    pub fn new(search: Arc<TourSearch>, default_origin: impl Into<String>) -> Self {
        let default_origin: String = default_origin.into();
        let mut parameters = HashMap::new();
        parameters.insert(
            "interests".to_string(),
            ParameterSchema::required(
                "array",
                "Customer interests: beach, culture, adventure, luxury, family, shopping, food, history, romance, nature, religious, wellness",
            )
            .with_items("string"),
        );
        parameters.insert(
            "budget_range".to_string(),
            ParameterSchema::optional("string", "budget, mid-range or luxury"),
        );
        parameters.insert(
            "travel_style".to_string(),
            ParameterSchema::optional("string", "relaxation, adventure, cultural, romantic or family"),
        );
        parameters.insert(
            "season".to_string(),
            ParameterSchema::optional("string", "summer, winter, spring or autumn"),
        );
        parameters.insert(
            "origin_city".to_string(),
            ParameterSchema::optional("string", "Departure city")
                .with_default(json!(default_origin)),
        );

        Self {
            id: ToolId::new(),
            parameters,
            search,
        }
    }

    async fn tours_for(&self, place: &str, origin: Option<&str>) -> Vec<Tour> {
        let mut request = SearchRequest::to(place);
        request.origin_city = origin.map(str::to_string);

        let outcome = self.search.search_direct(&request).await;
        debug!(place, status = ?outcome.status, count = outcome.count, "Recommendation search");
        if outcome.is_success() {
            outcome.tours
        } else {
            Vec::new()
        }
    }
}

#[async_trait]
impl Tool for GetTourRecommendationsTool {
    fn id(&self) -> &ToolId {
        &self.id
    }

    fn name(&self) -> &str {
        "get_tour_recommendations"
    }

    fn description(&self) -> &str {
        "Recommend tours matching the customer's interests, budget category and preferred season."
    }

    fn parameters(&self) -> &HashMap<String, ParameterSchema> {
        &self.parameters
    }

    async fn execute(&self, parameters: HashMap<String, Value>) -> Result<ToolResult> {
        let interests = strings_param(&parameters, "interests");
        let budget_range = string_param(&parameters, "budget_range");
        let travel_style = string_param(&parameters, "travel_style");
        let season = string_param(&parameters, "season");
        let origin = string_param(&parameters, "origin_city");

        let places: Vec<&str> = places_for_interests(&interests, season.as_deref())
            .into_iter()
            .take(MAX_RECOMMENDED_PLACES)
            .collect();
        let band = budget_range.as_deref().and_then(budget_band);

        let pages = join_all(places.iter().map(|place| self.tours_for(place, origin.as_deref()))).await;
        let pages: Vec<Vec<Tour>> = pages
            .into_iter()
            .map(|tours| match band {
                Some(band) => tours
                    .into_iter()
                    .filter(|t| t.price().is_some_and(|p| band.contains(p)))
                    .collect(),
                None => tours,
            })
            .collect();

        let mut tours = merge_unique(pages);
        sort_by_price(&mut tours, "price_asc");
        let total = tours.len();
        tours.truncate(MAX_RECOMMENDATIONS);

        info!(
            interests = ?interests,
            places = ?places,
            total,
            "Recommendations built"
        );

        Ok(ToolResult::success(json!({
            "status": "success",
            "recommendations": tours,
            "based_on": {
                "interests": interests,
                "budget_range": budget_range,
                "travel_style": travel_style,
                "season": season,
            },
            "recommended_destinations": places,
            "message": format!(
                "Found {} tours matching your interests: {}",
                total,
                interests.join(", ")
            ),
        })))
    }
}

/// `get_popular_destinations`: the curated destination list
pub struct GetPopularDestinationsTool {
    id: ToolId,
    parameters: HashMap<String, ParameterSchema>,
}

impl GetPopularDestinationsTool {
    pub fn new() -> Self {
        Self {
            id: ToolId::new(),
            parameters: HashMap::new(),
        }
    }
}

impl Default for GetPopularDestinationsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GetPopularDestinationsTool {
    fn id(&self) -> &ToolId {
        &self.id
    }

    fn name(&self) -> &str {
        "get_popular_destinations"
    }

    fn description(&self) -> &str {
        "Get list of popular travel destinations with brief descriptions."
    }

    fn parameters(&self) -> &HashMap<String, ParameterSchema> {
        &self.parameters
    }

    async fn execute(&self, _parameters: HashMap<String, Value>) -> Result<ToolResult> {
        Ok(ToolResult::success(json!({
            "status": "success",
            "destinations": POPULAR_DESTINATIONS,
            "message": "Here are our most popular destinations with their highlights",
        })))
    }
}
