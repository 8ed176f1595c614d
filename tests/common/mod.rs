//! Hand-written doubles shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use safar::catalog::{LocationNode, Tour, TourCatalog, TourPage, TourQuery};
use safar::channels::Helpdesk;
use safar::error::{CatalogError, CatalogResult, ChannelError};
use safar::provider::{Completion, FunctionSpec, LLMProvider, ProviderConfig};
use safar::{AgentError, Message, ToolCall};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn tour(id: u64, name: &str, price: f64, days: i64) -> Tour {
    Tour::from_json(json!({
        "id": id,
        "slug": format!("tour-{}", id),
        "name": name,
        "price": price,
        "currency": "USD",
        "days": days,
        "nights": days - 1,
    }))
}

/// Turkey (Istanbul, Antalya, Bodrum), UAE (Dubai, Sharjah), Egypt (Hurghada)
pub fn destination_tree() -> Vec<LocationNode> {
    vec![
        LocationNode::new(1, "Турция").with_children(vec![
            LocationNode::new(11, "Стамбул"),
            LocationNode::new(12, "Анталья"),
            LocationNode::new(13, "Бодрум"),
        ]),
        LocationNode::new(2, "ОАЭ").with_children(vec![
            LocationNode::new(21, "Дубай"),
            LocationNode::new(22, "Шарджа"),
        ]),
        LocationNode::new(3, "Египет").with_children(vec![LocationNode::new(31, "Хургада")]),
    ]
}

pub fn origin_list() -> Vec<LocationNode> {
    vec![
        LocationNode::new(100, "Ташкент"),
        LocationNode::new(101, "Самарканд"),
    ]
}

/// In-memory catalogue keyed by destination id, recording every query
pub struct MockCatalog {
    destinations: Vec<LocationNode>,
    origins: Vec<LocationNode>,
    tours: HashMap<u64, Vec<Tour>>,
    details: HashMap<String, Value>,
    failing_location_loads: AtomicUsize,
    fail_searches: bool,
    pub location_loads: AtomicUsize,
    pub queries: Mutex<Vec<TourQuery>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self {
            destinations: destination_tree(),
            origins: origin_list(),
            tours: HashMap::new(),
            details: HashMap::new(),
            failing_location_loads: AtomicUsize::new(0),
            fail_searches: false,
            location_loads: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tours(mut self, destination: u64, tours: Vec<Tour>) -> Self {
        self.tours.insert(destination, tours);
        self
    }

    pub fn with_details(mut self, slug: &str, details: Value) -> Self {
        self.details.insert(slug.to_string(), details);
        self
    }

    /// The next `n` destination loads fail
    pub fn failing_location_loads(self, n: usize) -> Self {
        self.failing_location_loads.store(n, Ordering::SeqCst);
        self
    }

    pub fn failing_searches(mut self) -> Self {
        self.fail_searches = true;
        self
    }

    pub fn searched_destinations(&self) -> Vec<Option<u64>> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|q| q.destination_location_child_id.map(|id| id.0))
            .collect()
    }

    pub fn search_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl TourCatalog for MockCatalog {
    async fn destinations(&self) -> CatalogResult<Vec<LocationNode>> {
        self.location_loads.fetch_add(1, Ordering::SeqCst);
        let pending = self.failing_location_loads.load(Ordering::SeqCst);
        if pending > 0 {
            self.failing_location_loads.store(pending - 1, Ordering::SeqCst);
            return Err(CatalogError::Status {
                endpoint: "locations".to_string(),
                status: 503,
            });
        }
        Ok(self.destinations.clone())
    }

    async fn origins(&self) -> CatalogResult<Vec<LocationNode>> {
        Ok(self.origins.clone())
    }

    async fn search(&self, query: &TourQuery) -> CatalogResult<TourPage> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail_searches {
            return Err(CatalogError::Unsuccessful {
                endpoint: "tours".to_string(),
                message: "maintenance".to_string(),
            });
        }
        let tours: Vec<Tour> = match query.destination_location_child_id {
            Some(id) => self.tours.get(&id.0).cloned().unwrap_or_default(),
            None => self.tours.values().flatten().cloned().collect(),
        };
        let total = tours.len() as u64;
        Ok(TourPage {
            tours,
            total: Some(total),
        })
    }

    async fn tour_details(&self, slug: &str) -> CatalogResult<Value> {
        self.details
            .get(slug)
            .cloned()
            .ok_or_else(|| CatalogError::Status {
                endpoint: format!("tours/view/{}", slug),
                status: 404,
            })
    }
}

/// Replays scripted completions and records the conversations it was sent
pub struct ScriptedProvider {
    config: ProviderConfig,
    script: Mutex<VecDeque<Result<Completion, String>>>,
    pub seen: Arc<Mutex<Vec<Vec<Message>>>>,
    pub offered: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Completion>) -> Self {
        Self::with_results(script.into_iter().map(Ok).collect())
    }

    pub fn with_results(script: Vec<Result<Completion, String>>) -> Self {
        Self {
            config: ProviderConfig::new("scripted"),
            script: Mutex::new(script.into()),
            seen: Arc::new(Mutex::new(Vec::new())),
            offered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every call fails
    pub fn failing() -> Self {
        Self::with_results(Vec::new())
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        functions: &[FunctionSpec],
    ) -> Result<Completion, AgentError> {
        self.seen.lock().unwrap().push(messages);
        self.offered
            .lock()
            .unwrap()
            .push(functions.iter().map(|f| f.name.clone()).collect());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(completion)) => Ok(completion),
            Some(Err(message)) => Err(AgentError::Provider(message)),
            None => Err(AgentError::Provider("script exhausted".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

pub fn call(id: &str, name: &str, arguments: Value) -> Completion {
    Completion::tools(vec![ToolCall::new(id, name, arguments.to_string())])
}

/// Records delivered messages; optionally rejects them
#[derive(Default)]
pub struct RecordingHelpdesk {
    pub sent: Mutex<Vec<(String, String)>>,
    pub reject: bool,
}

impl RecordingHelpdesk {
    pub fn rejecting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Helpdesk for RecordingHelpdesk {
    async fn send_message(&self, conversation_id: &str, content: &str) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .unwrap()
            .push((conversation_id.to_string(), content.to_string()));
        if self.reject {
            return Err(ChannelError::Rejected {
                channel: "chatwoot",
                status: 401,
            });
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        "https://helpdesk.test"
    }
}
