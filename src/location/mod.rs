//! Location resolution
//!
//! Free-text place names are matched against the catalogue's location lists:
//! first by equality of any spelling variant, then by substring containment in
//! either direction. The first hit in catalogue order wins.

use crate::catalog::{LocationNode, TourCatalog};
use crate::error::{CatalogError, CatalogResult};
use crate::types::LocationId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub mod transliteration;

pub use transliteration::{normalize, variants};

/// Country or city
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Country,
    City,
}

/// Country a city belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: LocationId,
    pub name: String,
}

/// A resolvable location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: LocationId,
    pub name: String,
    pub kind: LocationKind,
    /// Set for cities listed under a country
    pub parent: Option<ParentRef>,
    /// Normalized and transliterated spellings of `name`
    pub variants: Vec<String>,
}

impl LocationRecord {
    fn new(id: LocationId, name: &str, kind: LocationKind, parent: Option<ParentRef>) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            parent,
            variants: variants(name)
                .into_iter()
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }

    /// Name of the parent country, if any
    pub fn country(&self) -> Option<&str> {
        self.parent.as_ref().map(|p| p.name.as_str())
    }
}

/// How a query matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Partial,
}

/// Result of resolving a place name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMatch {
    pub record: LocationRecord,
    pub kind: MatchKind,
    /// Query spelling that produced the hit
    pub via: String,
}

impl LocationMatch {
    pub fn is_exact(&self) -> bool {
        self.kind == MatchKind::Exact
    }
}

/// Searchable list of locations in catalogue order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationIndex {
    records: Vec<LocationRecord>,
}

impl LocationIndex {
    /// Countries, each followed by its cities
    pub fn destinations(countries: &[LocationNode]) -> Self {
        let mut records = Vec::new();
        for country in countries {
            records.push(LocationRecord::new(
                country.id,
                &country.name,
                LocationKind::Country,
                None,
            ));
            let parent = ParentRef {
                id: country.id,
                name: country.name.clone(),
            };
            for city in &country.children {
                records.push(LocationRecord::new(
                    city.id,
                    &city.name,
                    LocationKind::City,
                    Some(parent.clone()),
                ));
            }
        }
        Self { records }
    }

    /// Flat list of departure cities
    pub fn origins(cities: &[LocationNode]) -> Self {
        Self {
            records: cities
                .iter()
                .map(|city| LocationRecord::new(city.id, &city.name, LocationKind::City, None))
                .collect(),
        }
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: LocationId) -> Option<&LocationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn countries(&self) -> impl Iterator<Item = &LocationRecord> {
        self.records
            .iter()
            .filter(|r| r.kind == LocationKind::Country)
    }

    /// Cities listed under `country`
    pub fn children_of(&self, country: LocationId) -> Vec<&LocationRecord> {
        self.records
            .iter()
            .filter(|r| r.parent.as_ref().is_some_and(|p| p.id == country))
            .collect()
    }

    /// Other cities of the same country
    pub fn siblings_of(&self, city: &LocationRecord) -> Vec<&LocationRecord> {
        match &city.parent {
            Some(parent) => self
                .children_of(parent.id)
                .into_iter()
                .filter(|r| r.id != city.id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Resolve `query` to the first exact, else the first partial, match
    pub fn resolve(&self, query: &str) -> Option<LocationMatch> {
        let search = variants(query);
        if search.iter().all(|v| v.is_empty()) {
            return None;
        }

        for needle in &search {
            for record in &self.records {
                if record.variants.iter().any(|v| v == needle) {
                    return Some(LocationMatch {
                        record: record.clone(),
                        kind: MatchKind::Exact,
                        via: needle.clone(),
                    });
                }
            }
        }

        for needle in search.iter().filter(|v| !v.is_empty()) {
            for record in &self.records {
                if record.variants.iter().any(|v| overlaps(needle, v)) {
                    return Some(LocationMatch {
                        record: record.clone(),
                        kind: MatchKind::Partial,
                        via: needle.clone(),
                    });
                }
            }
        }

        None
    }

    /// Distinct locations partially matching `query`, in match order
    pub fn partial_candidates(&self, query: &str, limit: usize) -> Vec<&LocationRecord> {
        self.partial_matching(query, limit, |_| true)
    }

    /// Like [`partial_candidates`](Self::partial_candidates), cities only
    pub fn partial_cities(&self, query: &str, limit: usize) -> Vec<&LocationRecord> {
        self.partial_matching(query, limit, |record| record.kind == LocationKind::City)
    }

    fn partial_matching<F>(&self, query: &str, limit: usize, keep: F) -> Vec<&LocationRecord>
    where
        F: Fn(&LocationRecord) -> bool,
    {
        let mut found: Vec<&LocationRecord> = Vec::new();
        for needle in variants(query).iter().filter(|v| !v.is_empty()) {
            for record in self.records.iter().filter(|r| keep(r)) {
                if found.len() >= limit {
                    return found;
                }
                if record.variants.iter().any(|v| overlaps(needle, v))
                    && !found.iter().any(|f| f.id == record.id)
                {
                    found.push(record);
                }
            }
        }
        found
    }
}

fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Departure or destination list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationScope {
    Origin,
    Destination,
}

impl LocationScope {
    /// `"origin"` selects departure cities; anything else destinations
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("origin") {
            Self::Origin
        } else {
            Self::Destination
        }
    }
}

/// Process-wide cache of the catalogue's location lists
///
/// Each list is fetched on first use and kept for the life of the process. A
/// failed fetch is not cached; the next call tries again.
pub struct LocationCache {
    catalog: Arc<dyn TourCatalog>,
    destinations: OnceCell<Arc<LocationIndex>>,
    origins: OnceCell<Arc<LocationIndex>>,
}

impl LocationCache {
    pub fn new(catalog: Arc<dyn TourCatalog>) -> Self {
        Self {
            catalog,
            destinations: OnceCell::new(),
            origins: OnceCell::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn TourCatalog> {
        &self.catalog
    }

    pub async fn destinations(&self) -> CatalogResult<Arc<LocationIndex>> {
        self.destinations
            .get_or_try_init(|| async {
                let countries = self.catalog.destinations().await.inspect_err(|e| {
                    warn!(error = %e, "Failed to load destination locations");
                })?;
                let index = LocationIndex::destinations(&countries);
                info!(locations = index.len(), "Destination index cached");
                Ok::<_, CatalogError>(Arc::new(index))
            })
            .await
            .cloned()
    }

    pub async fn origins(&self) -> CatalogResult<Arc<LocationIndex>> {
        self.origins
            .get_or_try_init(|| async {
                let cities = self.catalog.origins().await.inspect_err(|e| {
                    warn!(error = %e, "Failed to load origin locations");
                })?;
                let index = LocationIndex::origins(&cities);
                info!(locations = index.len(), "Origin index cached");
                Ok::<_, CatalogError>(Arc::new(index))
            })
            .await
            .cloned()
    }

    pub async fn index(&self, scope: LocationScope) -> CatalogResult<Arc<LocationIndex>> {
        match scope {
            LocationScope::Origin => self.origins().await,
            LocationScope::Destination => self.destinations().await,
        }
    }

    /// Resolve a place name in the given list
    pub async fn find(&self, query: &str, scope: LocationScope) -> CatalogResult<Option<LocationMatch>> {
        let index = self.index(scope).await?;
        let found = index.resolve(query);
        match &found {
            Some(m) => debug!(
                query,
                location = %m.record.name,
                id = %m.record.id,
                kind = ?m.kind,
                via = %m.via,
                "Location resolved"
            ),
            None => debug!(query, scope = ?scope, "No location match"),
        }
        Ok(found)
    }
}
