//! Booking inquiry capture tool

use crate::error::{AgentError, Result};
use crate::leads::{Lead, LeadSink};
use crate::tool::{ParameterSchema, Tool, ToolResult};
use crate::tools::string_param;
use crate::types::ToolId;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// `collect_customer_inquiry`: hand a ready customer to the sales team
pub struct CollectCustomerInquiryTool {
    id: ToolId,
    parameters: HashMap<String, ParameterSchema>,
    leads: Arc<dyn LeadSink>,
}

impl CollectCustomerInquiryTool {
    pub fn new(leads: Arc<dyn LeadSink>) -> Self {
        let mut parameters = HashMap::new();
        parameters.insert(
            "name".to_string(),
            ParameterSchema::required("string", "Customer name"),
        );
        for (key, description) in [
            ("phone", "Phone number"),
            ("telegram", "Telegram username"),
            ("destination", "Where the customer wants to go"),
            ("travel_dates", "When the customer wants to travel"),
            ("budget", "Budget as the customer stated it"),
            ("notes", "Anything else the sales team should know, e.g. the tour slug"),
        ] {
            parameters.insert(key.to_string(), ParameterSchema::optional("string", description));
        }

        Self {
            id: ToolId::new(),
            parameters,
            leads,
        }
    }
}

#[async_trait]
impl Tool for CollectCustomerInquiryTool {
    fn id(&self) -> &ToolId {
        &self.id
    }

    fn name(&self) -> &str {
        "collect_customer_inquiry"
    }

    fn description(&self) -> &str {
        "Record a customer who wants to book so a travel expert can contact them. \
         Requires a name and a phone number or Telegram username."
    }

    fn parameters(&self) -> &HashMap<String, ParameterSchema> {
        &self.parameters
    }

    async fn execute(&self, parameters: HashMap<String, Value>) -> Result<ToolResult> {
        let name = string_param(&parameters, "name").ok_or_else(|| {
            AgentError::InvalidToolParameters {
                tool_name: self.name().to_string(),
                reason: "name must be a non-empty string".to_string(),
            }
        })?;

        let lead = Lead {
            phone: string_param(&parameters, "phone"),
            telegram: string_param(&parameters, "telegram"),
            destination: string_param(&parameters, "destination"),
            travel_dates: string_param(&parameters, "travel_dates"),
            budget: string_param(&parameters, "budget"),
            notes: string_param(&parameters, "notes"),
            ..Lead::new(name.clone())
        };

        if !lead.is_reachable() {
            let message = "A phone number or Telegram username is required";
            return Ok(ToolResult::failure(
                json!({"status": "incomplete", "message": message}),
                message,
            ));
        }

        let lead_id = self.leads.record(lead).await?;
        Ok(ToolResult::success(json!({
            "status": "success",
            "lead_id": lead_id,
            "message": format!(
                "Thank you, {}! Our travel expert will contact you shortly.",
                name
            ),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::InMemoryLeadBook;

    #[tokio::test]
    async fn test_inquiry_recorded() {
        let book = Arc::new(InMemoryLeadBook::new());
        let tool = CollectCustomerInquiryTool::new(book.clone());
        let params = HashMap::from([
            ("name".to_string(), json!("Ali")),
            ("telegram".to_string(), json!("@ali")),
            ("destination".to_string(), json!("Dubay")),
        ]);

        let result = tool.execute(params).await.unwrap();
        assert_eq!(result.output["status"], "success");

        let leads = book.list().await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].telegram.as_deref(), Some("@ali"));
        assert_eq!(leads[0].destination.as_deref(), Some("Dubay"));
    }

    #[tokio::test]
    async fn test_inquiry_without_contact_is_rejected() {
        let book = Arc::new(InMemoryLeadBook::new());
        let tool = CollectCustomerInquiryTool::new(book.clone());
        let params = HashMap::from([("name".to_string(), json!("Ali"))]);

        let result = tool.execute(params).await.unwrap();
        assert_eq!(result.output["status"], "incomplete");
        assert!(result.error.is_some());
        assert!(book.is_empty().await);
    }
}
