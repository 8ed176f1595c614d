//! Front-end conversations
//!
//! Each chat on an external platform (a Telegram user, a Chatwoot conversation,
//! a dashboard session) is keyed by [`ConversationKey`] and owns one agent
//! thread. The registry keeps a readable log of the exchange and the
//! preferences picked up from it for the inspection endpoints.

use crate::context::MessageRole;
use crate::types::ThreadId;
use aho_corasick::AhoCorasick;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Platform a conversation arrives from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Telegram,
    Chatwoot,
    Dashboard,
    Api,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Telegram => "telegram",
            Channel::Chatwoot => "chatwoot",
            Channel::Dashboard => "dashboard",
            Channel::Api => "api",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "telegram" => Ok(Channel::Telegram),
            "chatwoot" => Ok(Channel::Chatwoot),
            "dashboard" => Ok(Channel::Dashboard),
            "api" => Ok(Channel::Api),
            other => Err(format!("unknown channel: {}", other)),
        }
    }
}

/// Identity of an external conversation, displayed as `channel:external_id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    pub channel: Channel,
    pub external_id: String,
}

impl ConversationKey {
    pub fn new(channel: Channel, external_id: impl Into<String>) -> Self {
        Self {
            channel,
            external_id: external_id.into(),
        }
    }

    pub fn telegram(chat_id: i64) -> Self {
        Self::new(Channel::Telegram, chat_id.to_string())
    }

    pub fn chatwoot(conversation_id: impl fmt::Display) -> Self {
        Self::new(Channel::Chatwoot, conversation_id.to_string())
    }

    pub fn dashboard(session_id: impl Into<String>) -> Self {
        Self::new(Channel::Dashboard, session_id)
    }

    /// Parse `channel:external_id`; anything else is taken as a Chatwoot id
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| Self::chatwoot(value.trim()))
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.channel, self.external_id)
    }
}

impl FromStr for ConversationKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (channel, id) = s
            .split_once(':')
            .ok_or_else(|| format!("expected channel:id, got {}", s))?;
        if id.is_empty() {
            return Err(format!("empty conversation id in {}", s));
        }
        Ok(Self::new(channel.parse()?, id))
    }
}

/// One logged turn; user turns hold the customer's own words without the
/// sender prefix the model sees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-conversation state kept by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub key: ConversationKey,
    pub thread_id: ThreadId,
    pub messages: Vec<LoggedMessage>,
    pub preferences: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl ConversationContext {
    fn new(key: ConversationKey) -> Self {
        Self {
            key,
            thread_id: ThreadId::new(),
            messages: Vec::new(),
            preferences: Map::new(),
            created_at: Utc::now(),
        }
    }

    /// Texts the customer sent, oldest first
    pub fn user_texts(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .collect()
    }
}

/// Conversation contexts by key, for the life of the process
#[derive(Debug, Clone, Default)]
pub struct ConversationRegistry {
    conversations: Arc<RwLock<HashMap<ConversationKey, ConversationContext>>>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thread of `key`, allocated on first sight
    pub async fn get_or_create_thread_id(&self, key: &ConversationKey) -> ThreadId {
        if let Some(context) = self.conversations.read().await.get(key) {
            return context.thread_id;
        }

        let mut conversations = self.conversations.write().await;
        let context = conversations.entry(key.clone()).or_insert_with(|| {
            info!(conversation = %key, "New conversation");
            ConversationContext::new(key.clone())
        });
        context.thread_id
    }

    pub async fn add_message(&self, key: &ConversationKey, role: MessageRole, content: impl Into<String>) {
        let mut conversations = self.conversations.write().await;
        let context = conversations
            .entry(key.clone())
            .or_insert_with(|| ConversationContext::new(key.clone()));
        context.messages.push(LoggedMessage {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
    }

    pub async fn get(&self, key: &ConversationKey) -> Option<ConversationContext> {
        self.conversations.read().await.get(key).cloned()
    }

    /// Every conversation, oldest first
    pub async fn list(&self) -> Vec<ConversationContext> {
        let mut all: Vec<ConversationContext> =
            self.conversations.read().await.values().cloned().collect();
        all.sort_by_key(|c| c.created_at);
        all
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }

    /// Start over under a fresh thread, dropping the log and preferences
    pub async fn reset(&self, key: &ConversationKey) -> ThreadId {
        let context = ConversationContext::new(key.clone());
        let thread_id = context.thread_id;
        self.conversations.write().await.insert(key.clone(), context);
        info!(conversation = %key, thread_id = %thread_id, "Conversation reset");
        thread_id
    }

    /// Merge `preferences` into the stored ones
    pub async fn update_preferences(&self, key: &ConversationKey, preferences: Map<String, Value>) {
        if preferences.is_empty() {
            return;
        }
        let mut conversations = self.conversations.write().await;
        if let Some(context) = conversations.get_mut(key) {
            debug!(conversation = %key, keys = preferences.len(), "Preferences updated");
            context.preferences.extend(preferences);
        }
    }
}

/// What the front-end knows about the customer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SenderInfo {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
}

fn known(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "Unknown")
}

/// Prefix `text` with what is known about the sender and platform
///
/// `"[Customer: Ali | @ali | Location: Tashkent | Platform: Telegram] text"`;
/// the text is returned unchanged when nothing is known.
pub fn contextual_message(text: &str, sender: &SenderInfo, platform: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(name) = known(&sender.name) {
        parts.push(format!("Customer: {}", name));
    }
    if let Some(username) = known(&sender.username) {
        parts.push(format!("@{}", username.trim_start_matches('@')));
    }
    if let Some(location) = known(&sender.location) {
        parts.push(format!("Location: {}", location));
    }
    if let Some(platform) = platform.map(str::trim).filter(|p| !p.is_empty()) {
        parts.push(format!("Platform: {}", platform));
    }

    if parts.is_empty() {
        text.to_string()
    } else {
        format!("[{}] {}", parts.join(" | "), text)
    }
}

const INTEREST_KEYWORDS: &[(&str, &[&str])] = &[
    ("beach", &["beach", "sea", "ocean", "swimming", "sun"]),
    ("culture", &["culture", "history", "museum", "heritage"]),
    ("adventure", &["adventure", "hiking", "mountain", "active"]),
    ("luxury", &["luxury", "premium", "5-star", "upscale"]),
    ("family", &["family", "kids", "children"]),
];

const DESTINATION_MENTIONS: &[&str] = &[
    "Turkey", "Dubai", "UAE", "Thailand", "Maldives", "Egypt", "Georgia",
];

/// Keyword automaton over every interest keyword, tagged with its interest
static INTEREST_MATCHER: LazyLock<Option<(AhoCorasick, Vec<&'static str>)>> = LazyLock::new(|| {
    let mut patterns = Vec::new();
    let mut interests = Vec::new();
    for (interest, keywords) in INTEREST_KEYWORDS {
        for keyword in *keywords {
            patterns.push(*keyword);
            interests.push(*interest);
        }
    }
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(&patterns)
        .ok()
        .map(|ac| (ac, interests))
});

static DESTINATION_MATCHER: LazyLock<Option<AhoCorasick>> = LazyLock::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(DESTINATION_MENTIONS)
        .ok()
});

/// Interests, first mentioned destination and budget category found in the
/// customer's messages
pub fn extract_preferences(user_texts: &[String]) -> Map<String, Value> {
    let text = user_texts.join(" ");
    let lower = text.to_lowercase();
    let mut preferences = Map::new();

    if let Some((matcher, tags)) = INTEREST_MATCHER.as_ref() {
        let mut found: Vec<&str> = Vec::new();
        for m in matcher.find_overlapping_iter(&text) {
            let interest = tags[m.pattern().as_usize()];
            if !found.contains(&interest) {
                found.push(interest);
            }
        }
        // Report in the fixed interest order
        let ordered: Vec<&str> = INTEREST_KEYWORDS
            .iter()
            .map(|(interest, _)| *interest)
            .filter(|interest| found.contains(interest))
            .collect();
        if !ordered.is_empty() {
            preferences.insert("interests".to_string(), json!(ordered));
        }
    }

    if let Some(matcher) = DESTINATION_MATCHER.as_ref() {
        if let Some(m) = matcher.find(&text) {
            preferences.insert(
                "destination".to_string(),
                json!(DESTINATION_MENTIONS[m.pattern().as_usize()]),
            );
        }
    }

    if lower.contains("budget") {
        let category = if lower.contains("luxury") {
            "Luxury"
        } else if ["cheap", "affordable", "low", "budget-friendly"]
            .iter()
            .any(|w| lower.contains(w))
        {
            "Budget-friendly"
        } else {
            "Mid-range"
        };
        preferences.insert("budget".to_string(), json!(category));
    }

    preferences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_and_parse() {
        let key = ConversationKey::telegram(42);
        assert_eq!(key.to_string(), "telegram:42");
        assert_eq!("telegram:42".parse::<ConversationKey>().unwrap(), key);
        assert!("nowhere:1".parse::<ConversationKey>().is_err());
        assert!("telegram:".parse::<ConversationKey>().is_err());
    }

    #[test]
    fn test_lenient_parse_defaults_to_chatwoot() {
        assert_eq!(ConversationKey::parse_lenient("123"), ConversationKey::chatwoot(123));
        assert_eq!(
            ConversationKey::parse_lenient("dashboard:abc"),
            ConversationKey::dashboard("abc")
        );
    }

    #[tokio::test]
    async fn test_thread_id_is_stable() {
        let registry = ConversationRegistry::new();
        let key = ConversationKey::chatwoot(7);
        let first = registry.get_or_create_thread_id(&key).await;
        let second = registry.get_or_create_thread_id(&key).await;
        assert_eq!(first, second);
        assert_eq!(registry.len().await, 1);

        let other = registry
            .get_or_create_thread_id(&ConversationKey::chatwoot(8))
            .await;
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn test_reset_starts_fresh() {
        let registry = ConversationRegistry::new();
        let key = ConversationKey::dashboard("s1");
        let before = registry.get_or_create_thread_id(&key).await;
        registry.add_message(&key, MessageRole::User, "Dubai please").await;
        let mut prefs = Map::new();
        prefs.insert("destination".to_string(), json!("Dubai"));
        registry.update_preferences(&key, prefs).await;

        let after = registry.reset(&key).await;
        assert_ne!(before, after);
        let context = registry.get(&key).await.unwrap();
        assert!(context.messages.is_empty());
        assert!(context.preferences.is_empty());
        assert_eq!(context.thread_id, after);
    }

    #[tokio::test]
    async fn test_message_log() {
        let registry = ConversationRegistry::new();
        let key = ConversationKey::telegram(1);
        registry.add_message(&key, MessageRole::User, "Salom").await;
        registry.add_message(&key, MessageRole::Assistant, "Assalomu alaykum!").await;

        let context = registry.get(&key).await.unwrap();
        assert_eq!(context.messages.len(), 2);
        assert_eq!(context.user_texts(), vec!["Salom"]);
    }

    #[test]
    fn test_contextual_message() {
        let sender = SenderInfo {
            name: Some("Ali".to_string()),
            username: Some("ali".to_string()),
            location: Some("Tashkent".to_string()),
            ..SenderInfo::default()
        };
        assert_eq!(
            contextual_message("Dubai tours?", &sender, Some("Telegram")),
            "[Customer: Ali | @ali | Location: Tashkent | Platform: Telegram] Dubai tours?"
        );
    }

    #[test]
    fn test_contextual_message_skips_unknown() {
        let sender = SenderInfo {
            name: Some("Unknown".to_string()),
            location: Some("".to_string()),
            ..SenderInfo::default()
        };
        assert_eq!(contextual_message("hi", &sender, None), "hi");
    }

    #[test]
    fn test_extract_preferences() {
        let prefs = extract_preferences(&[
            "We are a family with kids".to_string(),
            "Thinking about Dubai or Turkey, near the sea, budget is low".to_string(),
        ]);
        assert_eq!(prefs["interests"], json!(["beach", "family"]));
        assert_eq!(prefs["destination"], json!("Dubai"));
        assert_eq!(prefs["budget"], json!("Budget-friendly"));
    }

    #[test]
    fn test_extract_preferences_budget_categories() {
        let luxury = extract_preferences(&["budget for a LUXURY trip".to_string()]);
        assert_eq!(luxury["budget"], json!("Luxury"));

        let mid = extract_preferences(&["my budget is 900 dollars".to_string()]);
        assert_eq!(mid["budget"], json!("Mid-range"));

        assert!(extract_preferences(&["hello".to_string()]).is_empty());
    }
}
