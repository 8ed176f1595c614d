//! Tour search with a destination fallback cascade
//!
//! A search for a named destination walks an ordered list of stages until one
//! yields tours: the matched location itself, its parent country, its sibling
//! cities (or a country's child cities), then loosely matched candidates.
//! When every stage comes back empty the outcome carries popular alternatives.
//! Budget and duration filters run client side after every live call.

use crate::catalog::{Tour, TourCatalog, TourQuery};
use crate::destinations::{PopularDestination, POPULAR_DESTINATIONS};
use crate::error::CatalogResult;
use crate::location::{LocationCache, LocationKind, LocationRecord, LocationScope};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tours returned per outcome
pub const MAX_RESULTS: usize = 10;

/// Loosely matched locations tried when nothing matches exactly
pub const MAX_FUZZY_CANDIDATES: usize = 3;

/// Accepted difference between requested and offered trip length
pub const DURATION_TOLERANCE_DAYS: i64 = 2;

/// What the customer asked for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub origin_city: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    /// `DD.MM.YYYY`
    #[serde(default)]
    pub departure_date: Option<String>,
    #[serde(default)]
    pub budget_max: Option<f64>,
    #[serde(default)]
    pub duration_days: Option<i64>,
    #[serde(default = "default_sort")]
    pub sort_by: String,
}

fn default_sort() -> String {
    "price_asc".to_string()
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            origin_city: None,
            destination: None,
            departure_date: None,
            budget_max: None,
            duration_days: None,
            sort_by: default_sort(),
        }
    }
}

impl SearchRequest {
    pub fn to(destination: impl Into<String>) -> Self {
        Self {
            destination: Some(destination.into()),
            ..Self::default()
        }
    }

    pub fn from_city(mut self, origin: impl Into<String>) -> Self {
        self.origin_city = Some(origin.into());
        self
    }

    pub fn on(mut self, date: impl Into<String>) -> Self {
        self.departure_date = Some(date.into());
        self
    }

    pub fn budget(mut self, max: f64) -> Self {
        self.budget_max = Some(max);
        self
    }

    pub fn days(mut self, days: i64) -> Self {
        self.duration_days = Some(days);
        self
    }

    pub fn filter(&self) -> TourFilter {
        TourFilter {
            budget_max: self.budget_max.filter(|b| *b > 0.0),
            duration_days: self.duration_days.filter(|d| *d > 0),
        }
    }

    fn destination_text(&self) -> Option<&str> {
        self.destination
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    fn origin_text(&self) -> Option<&str> {
        self.origin_city
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
    }
}

/// Client-side price and length filters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TourFilter {
    pub budget_max: Option<f64>,
    pub duration_days: Option<i64>,
}

impl TourFilter {
    /// Whether `tour` passes; a tour lacking the filtered field never does
    pub fn admits(&self, tour: &Tour) -> bool {
        if let Some(budget) = self.budget_max {
            match tour.price() {
                Some(price) if price <= budget => {}
                _ => return false,
            }
        }
        if let Some(duration) = self.duration_days {
            match tour.day_count() {
                Some(days) if (days - duration as f64).abs() <= DURATION_TOLERANCE_DAYS as f64 => {}
                _ => return false,
            }
        }
        true
    }

    pub fn apply(&self, tours: Vec<Tour>) -> Vec<Tour> {
        let before = tours.len();
        let kept: Vec<Tour> = tours.into_iter().filter(|t| self.admits(t)).collect();
        if kept.len() != before {
            debug!(before, after = kept.len(), "Filters applied");
        }
        kept
    }
}

/// Cascade stage that produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStage {
    /// Single search without a cascade
    Direct,
    /// The exactly matched location
    Exact,
    /// Country of the matched city
    ParentCountry,
    /// Other cities of that country
    SiblingCities,
    /// Cities of the matched country
    ChildCities,
    /// A loosely matched location
    FuzzyCandidate,
    /// Nothing found, popular destinations suggested
    PopularAlternatives,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Success,
    NoTours,
    Error,
}

/// Result of a search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub stage: Option<SearchStage>,
    /// Tours passing the filters, before truncation
    pub count: usize,
    /// At most [`MAX_RESULTS`] tours
    pub tours: Vec<Tour>,
    pub has_more: bool,
    /// Location the tours were found in
    pub destination_found: Option<String>,
    /// Locations queried, in order
    pub searched: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<PopularDestination>,
    pub message: String,
}

impl SearchOutcome {
    fn found(stage: SearchStage, location: Option<String>, tours: Vec<Tour>, searched: Vec<String>) -> Self {
        let count = tours.len();
        let message = match (&location, stage) {
            (Some(place), SearchStage::Direct | SearchStage::Exact) => {
                format!("Found {} tours to {}", count, place)
            }
            (Some(place), _) => format!(
                "No tours for the requested place; found {} tours in {}",
                count, place
            ),
            (None, _) => format!("Found {} tours", count),
        };
        Self {
            status: SearchStatus::Success,
            stage: Some(stage),
            count,
            has_more: count > MAX_RESULTS,
            tours: tours.into_iter().take(MAX_RESULTS).collect(),
            destination_found: location,
            searched,
            alternatives: Vec::new(),
            message,
        }
    }

    fn empty(stage: SearchStage, destination_found: Option<String>, searched: Vec<String>, message: String) -> Self {
        Self {
            status: SearchStatus::NoTours,
            stage: Some(stage),
            count: 0,
            tours: Vec::new(),
            has_more: false,
            destination_found,
            searched,
            alternatives: Vec::new(),
            message,
        }
    }

    fn popular_alternatives(requested: &str, destination_found: Option<String>, searched: Vec<String>) -> Self {
        let names: Vec<&str> = POPULAR_DESTINATIONS.iter().map(|d| d.country).collect();
        let mut outcome = Self::empty(
            SearchStage::PopularAlternatives,
            destination_found,
            searched,
            format!(
                "No tours found for '{}'. Popular alternatives: {}",
                requested,
                names.join(", ")
            ),
        );
        outcome.alternatives = POPULAR_DESTINATIONS.to_vec();
        outcome
    }

    /// Outcome for a failed search
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SearchStatus::Error,
            stage: None,
            count: 0,
            tours: Vec::new(),
            has_more: false,
            destination_found: None,
            searched: Vec::new(),
            alternatives: Vec::new(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SearchStatus::Success
    }
}

/// Tour search over the catalogue
#[derive(Clone)]
pub struct TourSearch {
    locations: Arc<LocationCache>,
}

impl TourSearch {
    pub fn new(locations: Arc<LocationCache>) -> Self {
        Self { locations }
    }

    pub fn locations(&self) -> &Arc<LocationCache> {
        &self.locations
    }

    fn catalog(&self) -> &Arc<dyn TourCatalog> {
        self.locations.catalog()
    }

    /// Search with the full fallback cascade
    pub async fn search(&self, request: &SearchRequest) -> SearchOutcome {
        info!(
            origin = ?request.origin_city,
            destination = ?request.destination,
            date = ?request.departure_date,
            budget_max = ?request.budget_max,
            duration_days = ?request.duration_days,
            "Searching tours"
        );

        match self.cascade(request).await {
            Ok(outcome) => {
                info!(
                    status = ?outcome.status,
                    stage = ?outcome.stage,
                    count = outcome.count,
                    "Search finished"
                );
                outcome
            }
            Err(e) => {
                warn!(error = %e, "Tour search failed");
                SearchOutcome::error(format!("Search error: {}", e))
            }
        }
    }

    /// A single search without fallbacks
    ///
    /// The destination may match loosely; an unknown destination yields no
    /// tours rather than an unfiltered search.
    pub async fn search_direct(&self, request: &SearchRequest) -> SearchOutcome {
        match self.direct(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Direct tour search failed");
                SearchOutcome::error(format!("Search error: {}", e))
            }
        }
    }

    async fn base_query(&self, request: &SearchRequest) -> TourQuery {
        let mut query = TourQuery::new().sort(request.sort_by.clone());
        if let Some(date) = request.departure_date.as_deref().filter(|d| !d.trim().is_empty()) {
            query = query.departure_date(date.trim());
        }
        if let Some(origin) = request.origin_text() {
            match self.locations.find(origin, LocationScope::Origin).await {
                Ok(Some(found)) => query = query.origin(found.record.id),
                Ok(None) => debug!(origin, "Origin not found, searching from any city"),
                Err(e) => warn!(error = %e, "Origin lookup failed, searching from any city"),
            }
        }
        query
    }

    async fn direct(&self, request: &SearchRequest) -> CatalogResult<SearchOutcome> {
        let query = self.base_query(request).await;
        let filter = request.filter();

        let Some(destination) = request.destination_text() else {
            let tours = self.fetch(&query, &filter).await?;
            return Ok(self.finish(SearchStage::Direct, None, tours, Vec::new(), request));
        };

        let index = self.locations.destinations().await?;
        let Some(found) = index.resolve(destination) else {
            return Ok(SearchOutcome::empty(
                SearchStage::Direct,
                None,
                Vec::new(),
                format!("Destination '{}' not found", destination),
            ));
        };

        let tours = self.fetch(&query.retarget(found.record.id), &filter).await?;
        let name = found.record.name;
        Ok(self.finish(SearchStage::Direct, Some(name.clone()), tours, vec![name], request))
    }

    async fn cascade(&self, request: &SearchRequest) -> CatalogResult<SearchOutcome> {
        let Some(destination) = request.destination_text() else {
            return self.direct(request).await;
        };

        let query = self.base_query(request).await;
        let filter = request.filter();
        let index = self.locations.destinations().await?;
        let mut searched = Vec::new();

        let exact = index.resolve(destination).filter(|m| m.is_exact());
        let Some(found) = exact else {
            for candidate in index.partial_cities(destination, MAX_FUZZY_CANDIDATES) {
                searched.push(candidate.name.clone());
                let tours = self.fetch(&query.retarget(candidate.id), &filter).await?;
                if !tours.is_empty() {
                    return Ok(self.finish(
                        SearchStage::FuzzyCandidate,
                        Some(candidate.name.clone()),
                        tours,
                        searched,
                        request,
                    ));
                }
            }
            return Ok(SearchOutcome::popular_alternatives(destination, None, searched));
        };

        let record = found.record;
        searched.push(record.name.clone());
        let tours = self.fetch(&query.retarget(record.id), &filter).await?;
        if !tours.is_empty() {
            return Ok(self.finish(SearchStage::Exact, Some(record.name.clone()), tours, searched, request));
        }
        debug!(location = %record.name, "No tours at matched location, widening");

        match record.kind {
            LocationKind::City => {
                if let Some(parent) = &record.parent {
                    searched.push(parent.name.clone());
                    let tours = self.fetch(&query.retarget(parent.id), &filter).await?;
                    if !tours.is_empty() {
                        return Ok(self.finish(
                            SearchStage::ParentCountry,
                            Some(parent.name.clone()),
                            tours,
                            searched,
                            request,
                        ));
                    }
                }

                let siblings = index.siblings_of(&record);
                if let Some(outcome) = self
                    .union_stage(SearchStage::SiblingCities, &siblings, &query, &filter, &mut searched, request)
                    .await?
                {
                    return Ok(outcome);
                }
            }
            LocationKind::Country => {
                let children = index.children_of(record.id);
                if let Some(outcome) = self
                    .union_stage(SearchStage::ChildCities, &children, &query, &filter, &mut searched, request)
                    .await?
                {
                    return Ok(outcome);
                }
            }
        }

        Ok(SearchOutcome::popular_alternatives(
            destination,
            Some(record.name),
            searched,
        ))
    }

    /// Search every location concurrently and merge the results
    async fn union_stage(
        &self,
        stage: SearchStage,
        locations: &[&LocationRecord],
        query: &TourQuery,
        filter: &TourFilter,
        searched: &mut Vec<String>,
        request: &SearchRequest,
    ) -> CatalogResult<Option<SearchOutcome>> {
        if locations.is_empty() {
            return Ok(None);
        }

        let queries: Vec<TourQuery> = locations.iter().map(|l| query.retarget(l.id)).collect();
        searched.extend(locations.iter().map(|l| l.name.clone()));

        let pages = try_join_all(queries.iter().map(|q| self.fetch(q, filter))).await?;
        let merged = merge_unique(pages);
        if merged.is_empty() {
            return Ok(None);
        }

        let names: Vec<&str> = locations.iter().map(|l| l.name.as_str()).collect();
        Ok(Some(self.finish(
            stage,
            Some(names.join(", ")),
            merged,
            searched.clone(),
            request,
        )))
    }

    async fn fetch(&self, query: &TourQuery, filter: &TourFilter) -> CatalogResult<Vec<Tour>> {
        let page = self.catalog().search(query).await?;
        debug!(
            destination = ?query.destination_location_child_id,
            returned = page.tours.len(),
            "Catalogue search"
        );
        Ok(filter.apply(page.tours))
    }

    fn finish(
        &self,
        stage: SearchStage,
        location: Option<String>,
        mut tours: Vec<Tour>,
        searched: Vec<String>,
        request: &SearchRequest,
    ) -> SearchOutcome {
        if tours.is_empty() {
            let message = match &location {
                Some(place) => format!("No tours found to {}", place),
                None => "No tours found".to_string(),
            };
            return SearchOutcome::empty(stage, location, searched, message);
        }
        if matches!(stage, SearchStage::SiblingCities | SearchStage::ChildCities) {
            sort_by_price(&mut tours, &request.sort_by);
        }
        SearchOutcome::found(stage, location, tours, searched)
    }
}

/// Concatenate result lists, dropping repeated tour ids
pub fn merge_unique(pages: Vec<Vec<Tour>>) -> Vec<Tour> {
    let mut seen = HashSet::new();
    pages
        .into_iter()
        .flatten()
        .filter(|tour| match tour.id() {
            Some(id) => seen.insert(id),
            None => true,
        })
        .collect()
}

/// Re-sort a merged list for the price orderings; others keep merge order
pub fn sort_by_price(tours: &mut [Tour], sort_by: &str) {
    let key = |t: &Tour| t.price().unwrap_or(f64::MAX);
    match sort_by {
        "price_asc" => tours.sort_by(|a, b| key(a).total_cmp(&key(b))),
        "price_desc" => tours.sort_by(|a, b| {
            let a = a.price().unwrap_or(f64::MIN);
            let b = b.price().unwrap_or(f64::MIN);
            b.total_cmp(&a)
        }),
        _ => {}
    }
}
