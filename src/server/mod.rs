//! HTTP surface
//!
//! Chatwoot webhook, conversation inspection, direct search endpoints and the
//! dashboard chat page with its JSON API.

use crate::channels::chatwoot::{handle_webhook, Helpdesk};
use crate::config::ServerSettings;
use crate::consultant::TourConsultant;
use crate::conversation::{ConversationKey, SenderInfo};
use crate::destinations::POPULAR_DESTINATIONS;
use crate::error::{AgentError, Result};
use crate::search::SearchRequest;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

pub const DASHBOARD_APOLOGY: &str =
    "I apologize, but I'm having trouble processing your request right now. Please try again in a moment.";

#[derive(Clone)]
pub struct AppState {
    pub consultant: Arc<TourConsultant>,
    pub helpdesk: Arc<dyn Helpdesk>,
}

impl AppState {
    pub fn new(consultant: Arc<TourConsultant>, helpdesk: Arc<dyn Helpdesk>) -> Self {
        Self {
            consultant,
            helpdesk,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState, cors_enabled: bool) -> Router {
    let router = Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        // Helpdesk
        .route("/webhook/chatwoot", post(chatwoot_webhook))
        // Inspection
        .route("/conversations", get(list_conversations))
        .route("/conversation/:id", get(get_conversation))
        // Direct API
        .route("/api/search_tours", post(search_tours))
        .route("/api/destinations", get(destinations))
        .route("/api/leads", get(list_leads))
        // Dashboard
        .route("/chat", get(dashboard))
        .route("/api/chat", post(chat))
        .route("/api/chat/:session_id/reset", post(reset_chat))
        .with_state(state);

    let router = if cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl-C
pub async fn serve(settings: &ServerSettings, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AgentError::Configuration(format!("cannot bind {}: {}", addr, e)))?;

    info!(%addr, "Tour consultant server listening");
    axum::serve(listener, create_router(state, settings.cors_enabled))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AgentError::Internal(format!("server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down server");
}

async fn index() -> Json<Value> {
    Json(json!({
        "service": "Professional Tour Consultant Agent",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "AI-powered travel consultant specializing in international tours from Uzbekistan",
        "endpoints": {
            "webhook": "/webhook/chatwoot",
            "health": "/health",
            "conversations": "/conversations",
            "search_tours": "/api/search_tours",
            "destinations": "/api/destinations",
            "leads": "/api/leads",
            "dashboard": "/chat",
        },
        "destinations": POPULAR_DESTINATIONS
            .iter()
            .map(|d| d.country)
            .collect::<Vec<_>>(),
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "chatwoot_url": state.helpdesk.base_url(),
        "active_conversations": state.consultant.registry().len().await,
        "service": "Tour Consultant Agent",
    }))
}

async fn chatwoot_webhook(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let outcome = handle_webhook(&state.consultant, state.helpdesk.as_ref(), &payload).await;
    let status =
        StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(outcome.to_json()))
}

async fn list_conversations(State(state): State<AppState>) -> Json<Value> {
    let contexts = state.consultant.registry().list().await;
    let conversations: Map<String, Value> = contexts
        .iter()
        .map(|context| {
            (
                context.key.to_string(),
                json!({
                    "thread_id": context.thread_id,
                    "message_count": context.messages.len(),
                    "created_at": context.created_at,
                    "customer_preferences": context.preferences,
                }),
            )
        })
        .collect();

    Json(json!({
        "active_conversations": contexts.len(),
        "conversations": conversations,
    }))
}

async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let key = ConversationKey::parse_lenient(&id);
    match state.consultant.registry().get(&key).await {
        Some(context) => (
            StatusCode::OK,
            Json(json!({
                "conversation_id": key.to_string(),
                "state": context,
            })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Conversation not found"})),
        ),
    }
}

/// Body of `POST /api/search_tours`
#[derive(Debug, Default, Deserialize)]
pub struct SearchToursBody {
    pub origin_city: Option<String>,
    pub destination: Option<String>,
    pub date: Option<String>,
    pub budget: Option<f64>,
    pub duration: Option<i64>,
    pub sort: Option<String>,
}

impl From<SearchToursBody> for SearchRequest {
    fn from(body: SearchToursBody) -> Self {
        let mut request = SearchRequest {
            origin_city: body.origin_city,
            destination: body.destination,
            departure_date: body.date,
            budget_max: body.budget,
            duration_days: body.duration,
            ..SearchRequest::default()
        };
        if let Some(sort) = body.sort.filter(|s| !s.trim().is_empty()) {
            request.sort_by = sort;
        }
        request
    }
}

async fn search_tours(
    State(state): State<AppState>,
    Json(body): Json<SearchToursBody>,
) -> Json<Value> {
    let request = SearchRequest::from(body);
    let outcome = state.consultant.search().search(&request).await;
    match serde_json::to_value(&outcome) {
        Ok(value) => Json(value),
        Err(e) => Json(json!({"status": "error", "message": e.to_string()})),
    }
}

async fn destinations() -> Json<Value> {
    Json(json!({
        "status": "success",
        "destinations": POPULAR_DESTINATIONS,
        "message": "Here are our most popular destinations with their highlights",
    }))
}

async fn list_leads(State(state): State<AppState>) -> impl IntoResponse {
    match state.consultant.leads().list().await {
        Ok(leads) => (
            StatusCode::OK,
            Json(json!({"count": leads.len(), "leads": leads})),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "error", "message": e.to_string()})),
        ),
    }
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    pub preferences: Map<String, Value>,
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Json<ChatResponse> {
    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let key = ConversationKey::dashboard(session_id.clone());

    let reply = match state
        .consultant
        .reply(&key, &request.message, &SenderInfo::default(), None)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            error!(conversation = %key, error = %e, "Dashboard chat failed");
            DASHBOARD_APOLOGY.to_string()
        }
    };

    let preferences = state
        .consultant
        .registry()
        .get(&key)
        .await
        .map(|context| context.preferences)
        .unwrap_or_default();

    Json(ChatResponse {
        session_id,
        reply,
        preferences,
    })
}

async fn reset_chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let key = ConversationKey::dashboard(session_id.clone());
    match state.consultant.reset(&key).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"status": "reset", "session_id": session_id})),
        ),
        Err(e) => {
            error!(conversation = %key, error = %e, "Failed to reset dashboard session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": e.to_string()})),
            )
        }
    }
}
