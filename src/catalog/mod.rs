//! Tours catalogue access
//!
//! The catalogue is a remote REST API answering `{ "success": bool, "data": ... }`
//! envelopes. [`TourCatalog`] is the seam the search code depends on;
//! [`TurtoparClient`] is the HTTP implementation.

use crate::error::CatalogResult;
use crate::types::LocationId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod client;
pub mod model;

pub use client::TurtoparClient;
pub use model::{Hotel, Tour, TourDetails};

/// Default page size of the tours endpoint
pub const DEFAULT_PER_PAGE: u32 = 16;

/// A location as served by the catalogue: a country with its cities, or a
/// flat departure city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationNode {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub children: Vec<LocationNode>,
}

impl LocationNode {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: LocationId(id),
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<LocationNode>) -> Self {
        self.children = children;
        self
    }
}

/// Query parameters of `GET /tours`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_location_child_id: Option<LocationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_location_child_id: Option<LocationId>,
    /// Departure date, `DD.MM.YYYY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// `price_asc`, `price_desc`, `date_asc` or `date_desc`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default = "first_page", skip_serializing_if = "is_first_page")]
    pub page: u32,
    #[serde(default = "default_per_page", skip_serializing_if = "is_default_per_page")]
    pub per_page: u32,
}

fn first_page() -> u32 {
    1
}

fn is_first_page(page: &u32) -> bool {
    *page == 1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

fn is_default_per_page(per_page: &u32) -> bool {
    *per_page == DEFAULT_PER_PAGE
}

impl Default for TourQuery {
    fn default() -> Self {
        Self {
            origin_location_child_id: None,
            destination_location_child_id: None,
            origin_date: None,
            return_date: None,
            min_price: None,
            max_price: None,
            currency: None,
            sort: None,
            page: first_page(),
            per_page: default_per_page(),
        }
    }
}

impl TourQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(mut self, id: LocationId) -> Self {
        self.origin_location_child_id = Some(id);
        self
    }

    pub fn destination(mut self, id: LocationId) -> Self {
        self.destination_location_child_id = Some(id);
        self
    }

    pub fn departure_date(mut self, date: impl Into<String>) -> Self {
        self.origin_date = Some(date.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// The same query aimed at another destination
    pub fn retarget(&self, destination: LocationId) -> Self {
        Self {
            destination_location_child_id: Some(destination),
            ..self.clone()
        }
    }
}

/// One page of tour search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourPage {
    pub tours: Vec<Tour>,
    /// Total match count reported by the API (`links.count`)
    pub total: Option<u64>,
}

/// Read access to the tours catalogue
#[async_trait]
pub trait TourCatalog: Send + Sync {
    /// Destination countries with their cities (`/locations?with_child=1`)
    async fn destinations(&self) -> CatalogResult<Vec<LocationNode>>;

    /// Departure cities (`/locations/origin-locations`)
    async fn origins(&self) -> CatalogResult<Vec<LocationNode>>;

    /// Search tours (`/tours`)
    async fn search(&self, query: &TourQuery) -> CatalogResult<TourPage>;

    /// Raw detail record of one tour (`/tours/view/{slug}`)
    async fn tour_details(&self, slug: &str) -> CatalogResult<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tour_query_omits_defaults() {
        let query = TourQuery::new()
            .origin(LocationId(3))
            .destination(LocationId(13))
            .sort("price_asc");

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["origin_location_child_id"], 3);
        assert_eq!(json["destination_location_child_id"], 13);
        assert_eq!(json["sort"], "price_asc");
        assert!(json.get("page").is_none());
        assert!(json.get("per_page").is_none());
        assert!(json.get("origin_date").is_none());
    }

    #[test]
    fn test_tour_query_keeps_non_default_paging() {
        let query = TourQuery {
            page: 2,
            per_page: 32,
            ..TourQuery::default()
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["page"], 2);
        assert_eq!(json["per_page"], 32);
    }

    #[test]
    fn test_retarget_keeps_filters() {
        let query = TourQuery::new()
            .destination(LocationId(13))
            .departure_date("01.09.2025");
        let retargeted = query.retarget(LocationId(7));

        assert_eq!(retargeted.destination_location_child_id, Some(LocationId(7)));
        assert_eq!(retargeted.origin_date.as_deref(), Some("01.09.2025"));
    }

    #[test]
    fn test_location_node_children_default() {
        let node: LocationNode = serde_json::from_str(r#"{"id": 5, "name": "Tbilisi"}"#).unwrap();
        assert!(node.children.is_empty());
        assert_eq!(node.id, LocationId(5));
    }
}
