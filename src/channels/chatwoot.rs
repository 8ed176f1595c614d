//! Chatwoot helpdesk integration
//!
//! Chatwoot posts every conversation event to the webhook. Incoming customer
//! messages are answered by the consultant and the reply is posted back to
//! the conversation through the Chatwoot REST API.

use crate::consultant::TourConsultant;
use crate::conversation::{ConversationKey, SenderInfo};
use crate::error::ChannelError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

const CHANNEL: &str = "chatwoot";

/// Who wrote the message, as Chatwoot reports it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatwootSender {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub id: Option<Value>,
    pub location: Option<String>,
    pub company: Option<String>,
}

impl ChatwootSender {
    pub fn to_sender_info(&self) -> SenderInfo {
        SenderInfo {
            name: Some(self.name.clone()),
            username: None,
            email: self.email.clone(),
            phone: self.phone.clone(),
            location: self.location.clone(),
            company: self.company.clone(),
        }
    }
}

/// Inbox the message arrived in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxInfo {
    pub channel: String,
    pub inbox_id: Option<i64>,
    pub can_reply: bool,
}

impl InboxInfo {
    /// `Instagram`, `WhatsApp` or `Telegram` when the channel name says so
    pub fn platform(&self) -> Option<&'static str> {
        platform_label(&self.channel)
    }
}

/// A customer message worth answering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub conversation_id: String,
    pub content: String,
    /// `None` when the event carries no sender object
    pub sender: Option<ChatwootSender>,
    pub inbox: InboxInfo,
    pub timestamp: Option<Value>,
}

impl IncomingMessage {
    pub fn sender_info(&self) -> SenderInfo {
        self.sender
            .as_ref()
            .map(ChatwootSender::to_sender_info)
            .unwrap_or_default()
    }
}

/// Customer-facing platform behind a Chatwoot channel name
pub fn platform_label(channel: &str) -> Option<&'static str> {
    let channel = channel.to_lowercase();
    if channel.contains("instagram") {
        Some("Instagram")
    } else if channel.contains("whatsapp") {
        Some("WhatsApp")
    } else if channel.contains("telegram") {
        Some("Telegram")
    } else {
        None
    }
}

fn text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Pick the customer message out of a webhook payload
///
/// Returns `None` for other events, outgoing or activity messages and empty
/// content.
pub fn extract_message_info(payload: &Value) -> Option<IncomingMessage> {
    let event = payload.get("event").and_then(Value::as_str)?;
    if event != "message_created" && event != "automation_event.message_created" {
        return None;
    }

    let conversation_id = match payload.get("id")? {
        Value::Number(n) => n.to_string(),
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return None,
    };

    let message = payload.get("messages")?.as_array()?.first()?;

    let incoming = match message.get("message_type") {
        Some(Value::Number(n)) => n.as_i64() == Some(0),
        Some(Value::String(s)) => s == "incoming",
        _ => false,
    };
    if !incoming {
        return None;
    }

    let content = text(message, "content")?;

    let sender = message.get("sender").filter(|s| s.is_object()).map(|sender| {
        let attributes = sender.get("additional_attributes").unwrap_or(&Value::Null);
        ChatwootSender {
            name: text(sender, "name").unwrap_or_else(|| "Unknown".to_string()),
            email: text(sender, "email"),
            phone: text(sender, "phone_number"),
            id: sender.get("id").cloned().filter(|id| !id.is_null()),
            location: text(attributes, "location"),
            company: text(attributes, "company_name"),
        }
    });

    let inbox = InboxInfo {
        channel: text(payload, "channel").unwrap_or_default(),
        inbox_id: payload.get("inbox_id").and_then(Value::as_i64),
        can_reply: payload
            .get("can_reply")
            .and_then(Value::as_bool)
            .unwrap_or(true),
    };

    Some(IncomingMessage {
        conversation_id,
        content,
        sender,
        inbox,
        timestamp: message.get("created_at").cloned(),
    })
}

/// Reply sent when the consultant cannot answer; `None` when no sender came
/// with the message
pub fn fallback_message(sender_name: Option<&str>) -> String {
    let name = sender_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("there");
    format!(
        "Hi {}! Thanks for your interest in our tours. Let me connect you with our travel expert right away to help you plan your perfect getaway!",
        name
    )
}

/// Outbound side of the helpdesk
#[async_trait]
pub trait Helpdesk: Send + Sync {
    /// Post a public agent reply to the conversation
    async fn send_message(&self, conversation_id: &str, content: &str) -> Result<(), ChannelError>;

    /// Where the helpdesk lives, for health reports
    fn base_url(&self) -> &str;
}

/// Chatwoot REST client
#[derive(Debug, Clone)]
pub struct ChatwootClient {
    client: Client,
    base_url: String,
    api_token: String,
    account_id: u64,
}

impl ChatwootClient {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>, account_id: u64) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            account_id,
        }
    }

    pub fn messages_url(&self, conversation_id: &str) -> String {
        format!(
            "{}/api/v1/accounts/{}/conversations/{}/messages",
            self.base_url, self.account_id, conversation_id
        )
    }
}

#[async_trait]
impl Helpdesk for ChatwootClient {
    async fn send_message(&self, conversation_id: &str, content: &str) -> Result<(), ChannelError> {
        let response = self
            .client
            .post(self.messages_url(conversation_id))
            .header("api_access_token", &self.api_token)
            .json(&json!({
                "content": content,
                "message_type": "outgoing",
                "private": false,
            }))
            .send()
            .await
            .map_err(|source| ChannelError::Http {
                channel: CHANNEL,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(conversation_id, status = status.as_u16(), "Chatwoot rejected the reply");
            return Err(ChannelError::Rejected {
                channel: CHANNEL,
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// How a webhook call was handled
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// Not a customer message
    Ignored,
    /// Reply delivered
    Replied { conversation_id: String },
    /// The consultant failed; the fallback text was sent
    Fallback { conversation_id: String },
    /// The reply could not be delivered
    DeliveryFailed { conversation_id: String, reason: String },
}

impl WebhookOutcome {
    /// HTTP status the webhook answers with
    pub fn status_code(&self) -> u16 {
        match self {
            WebhookOutcome::DeliveryFailed { .. } => 500,
            _ => 200,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            WebhookOutcome::Ignored => json!({
                "status": "ignored",
                "reason": "not a valid incoming message",
            }),
            WebhookOutcome::Replied { conversation_id } => json!({
                "status": "success",
                "message": "Tour consultant response sent",
                "conversation_id": conversation_id,
            }),
            WebhookOutcome::Fallback { conversation_id } => json!({
                "status": "fallback",
                "message": "Sent fallback response due to AI processing error",
                "conversation_id": conversation_id,
            }),
            WebhookOutcome::DeliveryFailed { reason, .. } => json!({
                "status": "error",
                "message": format!("Failed to send response to Chatwoot: {}", reason),
            }),
        }
    }
}

/// Answer one webhook payload
pub async fn handle_webhook(
    consultant: &TourConsultant,
    helpdesk: &dyn Helpdesk,
    payload: &Value,
) -> WebhookOutcome {
    let Some(message) = extract_message_info(payload) else {
        return WebhookOutcome::Ignored;
    };

    let key = ConversationKey::chatwoot(&message.conversation_id);
    info!(
        conversation = %key,
        sender = message.sender.as_ref().map(|s| s.name.as_str()).unwrap_or("Unknown"),
        platform = ?message.inbox.platform(),
        "Processing tour inquiry"
    );

    let conversation_id = message.conversation_id.clone();
    match consultant
        .reply(
            &key,
            &message.content,
            &message.sender_info(),
            message.inbox.platform(),
        )
        .await
    {
        Ok(reply) => match helpdesk.send_message(&conversation_id, &reply).await {
            Ok(()) => WebhookOutcome::Replied { conversation_id },
            Err(e) => {
                error!(conversation = %key, error = %e, "Failed to deliver reply");
                WebhookOutcome::DeliveryFailed {
                    conversation_id,
                    reason: e.to_string(),
                }
            }
        },
        Err(e) => {
            error!(conversation = %key, error = %e, "Consultant failed, sending fallback");
            if let Err(e) = helpdesk
                .send_message(
                    &conversation_id,
                    &fallback_message(message.sender.as_ref().map(|s| s.name.as_str())),
                )
                .await
            {
                warn!(conversation = %key, error = %e, "Fallback delivery failed");
            }
            WebhookOutcome::Fallback { conversation_id }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Value {
        json!({
            "event": "message_created",
            "id": 321,
            "channel": "Channel::Instagram",
            "inbox_id": 4,
            "messages": [{
                "message_type": 0,
                "content": "  Dubayga tur bormi?  ",
                "created_at": 1717000000,
                "sender": {
                    "id": 9,
                    "name": "Ali",
                    "email": "ali@example.com",
                    "phone_number": "",
                    "additional_attributes": {"location": "Tashkent", "company_name": "Acme"}
                }
            }]
        })
    }

    #[test]
    fn test_extracts_incoming_message() {
        let message = extract_message_info(&payload()).unwrap();
        assert_eq!(message.conversation_id, "321");
        assert_eq!(message.content, "Dubayga tur bormi?");
        let sender = message.sender.unwrap();
        assert_eq!(sender.name, "Ali");
        assert_eq!(sender.email.as_deref(), Some("ali@example.com"));
        assert!(sender.phone.is_none());
        assert_eq!(sender.location.as_deref(), Some("Tashkent"));
        assert_eq!(message.inbox.inbox_id, Some(4));
        assert!(message.inbox.can_reply);
        assert_eq!(message.inbox.platform(), Some("Instagram"));
    }

    #[test]
    fn test_accepts_string_message_type_and_automation_event() {
        let mut p = payload();
        p["event"] = json!("automation_event.message_created");
        p["messages"][0]["message_type"] = json!("incoming");
        assert!(extract_message_info(&p).is_some());
    }

    #[test]
    fn test_ignores_other_events_and_outgoing() {
        let mut p = payload();
        p["event"] = json!("conversation_updated");
        assert!(extract_message_info(&p).is_none());

        let mut p = payload();
        p["messages"][0]["message_type"] = json!(1);
        assert!(extract_message_info(&p).is_none());

        let mut p = payload();
        p["messages"][0]["content"] = json!("   ");
        assert!(extract_message_info(&p).is_none());

        let mut p = payload();
        p["messages"] = json!([]);
        assert!(extract_message_info(&p).is_none());
    }

    #[test]
    fn test_missing_sender_and_unnamed_sender() {
        let mut p = payload();
        p["messages"][0].as_object_mut().unwrap().remove("sender");
        let message = extract_message_info(&p).unwrap();
        assert!(message.sender.is_none());
        assert_eq!(message.sender_info(), SenderInfo::default());

        let mut p = payload();
        p["messages"][0]["sender"].as_object_mut().unwrap().remove("name");
        let message = extract_message_info(&p).unwrap();
        assert_eq!(message.sender.unwrap().name, "Unknown");
    }

    #[test]
    fn test_platform_labels() {
        assert_eq!(platform_label("Channel::Whatsapp"), Some("WhatsApp"));
        assert_eq!(platform_label("Channel::Telegram"), Some("Telegram"));
        assert_eq!(platform_label("Channel::WebWidget"), None);
    }

    #[test]
    fn test_fallback_message() {
        assert!(fallback_message(Some("Ali")).starts_with("Hi Ali! Thanks for your interest"));
        assert!(fallback_message(Some("Unknown")).starts_with("Hi Unknown!"));
        assert!(fallback_message(None).starts_with("Hi there!"));
    }

    #[test]
    fn test_messages_url() {
        let client = ChatwootClient::new("https://app.chatwoot.com/", "token", 3);
        assert_eq!(
            client.messages_url("321"),
            "https://app.chatwoot.com/api/v1/accounts/3/conversations/321/messages"
        );
    }

    #[test]
    fn test_outcome_status_codes() {
        assert_eq!(WebhookOutcome::Ignored.status_code(), 200);
        let failed = WebhookOutcome::DeliveryFailed {
            conversation_id: "1".to_string(),
            reason: "401".to_string(),
        };
        assert_eq!(failed.status_code(), 500);
        assert_eq!(failed.to_json()["status"], "error");
    }
}
