//! HTTP client for the Turtopar tours API

use crate::catalog::{LocationNode, Tour, TourCatalog, TourPage, TourQuery};
use crate::error::{CatalogError, CatalogResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.turtopar.uz/api/v1";

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    links: Option<Value>,
}

/// Tours API client
#[derive(Debug, Clone)]
pub struct TurtoparClient {
    client: Client,
    base_url: String,
    locations_timeout: Duration,
    tours_timeout: Duration,
}

impl TurtoparClient {
    /// Client for `base_url` with the default 10 s / 15 s timeouts
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            locations_timeout: Duration::from_secs(10),
            tours_timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeouts(mut self, locations: Duration, tours: Duration) -> Self {
        self.locations_timeout = locations;
        self.tours_timeout = tours;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<Q>(&self, endpoint: &str, query: &Q, timeout: Duration) -> CatalogResult<Envelope>
    where
        Q: Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(url = %url, "Tours API request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| {
                warn!(endpoint, error = %source, "Tours API request failed");
                CatalogError::Http {
                    endpoint: endpoint.to_string(),
                    source,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "Tours API returned an error status");
            return Err(CatalogError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let envelope: Envelope = response.json().await.map_err(|e| CatalogError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        if !envelope.success {
            let message = envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| "success: false".to_string());
            warn!(endpoint, message = %message, "Tours API reported failure");
            return Err(CatalogError::Unsuccessful {
                endpoint: endpoint.to_string(),
                message,
            });
        }

        Ok(envelope)
    }
}

impl Default for TurtoparClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, data: Value) -> CatalogResult<T> {
    let data = if data.is_null() {
        Value::Array(Vec::new())
    } else {
        data
    };
    serde_json::from_value(data).map_err(|e| CatalogError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl TourCatalog for TurtoparClient {
    async fn destinations(&self) -> CatalogResult<Vec<LocationNode>> {
        let envelope = self
            .get("locations", &[("with_child", "1")], self.locations_timeout)
            .await?;
        let countries: Vec<LocationNode> = decode("locations", envelope.data)?;
        info!(countries = countries.len(), "Loaded destination locations");
        Ok(countries)
    }

    async fn origins(&self) -> CatalogResult<Vec<LocationNode>> {
        let no_params: &[(&str, &str)] = &[];
        let envelope = self
            .get("locations/origin-locations", no_params, self.locations_timeout)
            .await?;
        let cities: Vec<LocationNode> = decode("locations/origin-locations", envelope.data)?;
        info!(cities = cities.len(), "Loaded origin locations");
        Ok(cities)
    }

    async fn search(&self, query: &TourQuery) -> CatalogResult<TourPage> {
        let envelope = self.get("tours", query, self.tours_timeout).await?;
        let tours: Vec<Tour> = decode("tours", envelope.data)?;
        let total = envelope
            .links
            .as_ref()
            .and_then(|links| links.get("count"))
            .and_then(Value::as_u64);

        debug!(
            destination = ?query.destination_location_child_id,
            returned = tours.len(),
            total = ?total,
            "Tours API search finished"
        );
        Ok(TourPage { tours, total })
    }

    async fn tour_details(&self, slug: &str) -> CatalogResult<Value> {
        let endpoint = format!("tours/view/{}", slug);
        let no_params: &[(&str, &str)] = &[];
        let envelope = self.get(&endpoint, no_params, self.tours_timeout).await?;
        if !envelope.data.is_object() {
            return Err(CatalogError::Decode {
                endpoint,
                message: "tour data is not an object".to_string(),
            });
        }
        Ok(envelope.data)
    }
}
