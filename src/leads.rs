//! Customer inquiry capture
//!
//! When a customer is ready to book, the consultant records a [`Lead`]. Leads
//! are kept in a [`LeadSink`]; [`NotifyingLeadSink`] additionally forwards a
//! summary to the sales team.

use crate::error::{ChannelError, StorageError};
use crate::types::LeadId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// A customer ready to be contacted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub destination: Option<String>,
    pub travel_dates: Option<String>,
    pub budget: Option<String>,
    pub notes: Option<String>,
    /// Conversation the lead came from
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LeadId::new(),
            name: name.into(),
            phone: None,
            telegram: None,
            destination: None,
            travel_dates: None,
            budget: None,
            notes: None,
            source: None,
            created_at: Utc::now(),
        }
    }

    /// A lead is reachable with a phone number or a Telegram handle
    pub fn is_reachable(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.phone) || present(&self.telegram)
    }

    /// Multi-line summary for the sales chat
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "🆕 New tour inquiry".to_string(),
            format!("👤 Name: {}", self.name),
        ];
        let optional = [
            ("📞 Phone", &self.phone),
            ("💬 Telegram", &self.telegram),
            ("📍 Destination", &self.destination),
            ("📅 Dates", &self.travel_dates),
            ("💰 Budget", &self.budget),
            ("📝 Notes", &self.notes),
            ("🔗 Source", &self.source),
        ];
        for (label, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                lines.push(format!("{}: {}", label, value));
            }
        }
        lines.join("\n")
    }
}

/// Where leads are kept
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn record(&self, lead: Lead) -> Result<LeadId, StorageError>;

    /// All leads, oldest first
    async fn list(&self) -> Result<Vec<Lead>, StorageError>;
}

/// Delivers lead summaries to people
#[async_trait]
pub trait LeadNotifier: Send + Sync {
    async fn notify(&self, lead: &Lead) -> Result<(), ChannelError>;
}

/// Process-local lead list
#[derive(Debug, Clone, Default)]
pub struct InMemoryLeadBook {
    leads: Arc<RwLock<Vec<Lead>>>,
}

impl InMemoryLeadBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.leads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.leads.read().await.is_empty()
    }
}

#[async_trait]
impl LeadSink for InMemoryLeadBook {
    async fn record(&self, lead: Lead) -> Result<LeadId, StorageError> {
        let mut leads = self.leads.write().await;
        if leads.iter().any(|l| l.id == lead.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Lead with ID {} already exists",
                lead.id
            )));
        }
        let id = lead.id;
        leads.push(lead);
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Lead>, StorageError> {
        Ok(self.leads.read().await.clone())
    }
}

/// Stores leads and forwards each one to a notifier
///
/// A failed notification is logged; the lead stays recorded.
pub struct NotifyingLeadSink {
    inner: Arc<dyn LeadSink>,
    notifier: Arc<dyn LeadNotifier>,
}

impl NotifyingLeadSink {
    pub fn new(inner: Arc<dyn LeadSink>, notifier: Arc<dyn LeadNotifier>) -> Self {
        Self { inner, notifier }
    }
}

#[async_trait]
impl LeadSink for NotifyingLeadSink {
    async fn record(&self, lead: Lead) -> Result<LeadId, StorageError> {
        let id = self.inner.record(lead.clone()).await?;
        info!(lead_id = %id, name = %lead.name, "Lead recorded");

        if let Err(e) = self.notifier.notify(&lead).await {
            warn!(lead_id = %id, error = %e, "Lead notification failed");
        }
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Lead>, StorageError> {
        self.inner.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl LeadNotifier for RecordingNotifier {
        async fn notify(&self, lead: &Lead) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push(lead.summary());
            if self.fail {
                return Err(ChannelError::Delivery {
                    channel: "telegram",
                    reason: "chat not found".to_string(),
                });
            }
            Ok(())
        }
    }

    fn lead() -> Lead {
        Lead {
            phone: Some("+998901234567".to_string()),
            destination: Some("Dubay".to_string()),
            ..Lead::new("Ali")
        }
    }

    #[test]
    fn test_reachability() {
        assert!(lead().is_reachable());
        assert!(!Lead::new("Ali").is_reachable());

        let mut blank = Lead::new("Ali");
        blank.telegram = Some("  ".to_string());
        assert!(!blank.is_reachable());
    }

    #[test]
    fn test_summary_skips_missing_fields() {
        let summary = lead().summary();
        assert!(summary.contains("👤 Name: Ali"));
        assert!(summary.contains("📞 Phone: +998901234567"));
        assert!(summary.contains("📍 Destination: Dubay"));
        assert!(!summary.contains("Telegram"));
    }

    #[tokio::test]
    async fn test_lead_book_rejects_duplicate_id() {
        let book = InMemoryLeadBook::new();
        let lead = lead();
        book.record(lead.clone()).await.unwrap();
        let err = book.record(lead).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
        assert_eq!(book.len().await, 1);
    }

    #[tokio::test]
    async fn test_notifying_sink_keeps_lead_when_notify_fails() {
        let book = Arc::new(InMemoryLeadBook::new());
        let notifier = Arc::new(RecordingNotifier {
            sent: Mutex::new(Vec::new()),
            fail: true,
        });
        let sink = NotifyingLeadSink::new(book.clone(), notifier.clone());

        sink.record(lead()).await.unwrap();

        assert_eq!(sink.list().await.unwrap().len(), 1);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }
}
