//! System prompt of the tour consultant
//!
//! The prompt is rendered once per model call so the current date the model sees
//! is always fresh.

use chrono::{DateTime, Utc};

/// Default persona name
pub const DEFAULT_CONSULTANT_NAME: &str = "Aziza";

/// Default departure city when the customer names none
pub const DEFAULT_ORIGIN: &str = "Toshkent";

/// Instruction text sent as the first message of every model call
#[derive(Debug, Clone, PartialEq)]
pub enum SystemPrompt {
    /// Fixed text
    Static(String),
    /// The tour consultant persona
    Consultant(ConsultantPrompt),
}

impl SystemPrompt {
    /// Render the prompt for the given moment
    pub fn render(&self, now: DateTime<Utc>) -> String {
        match self {
            Self::Static(text) => text.clone(),
            Self::Consultant(prompt) => prompt.render(now),
        }
    }
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self::Consultant(ConsultantPrompt::default())
    }
}

impl From<ConsultantPrompt> for SystemPrompt {
    fn from(prompt: ConsultantPrompt) -> Self {
        Self::Consultant(prompt)
    }
}

impl From<String> for SystemPrompt {
    fn from(text: String) -> Self {
        Self::Static(text)
    }
}

impl From<&str> for SystemPrompt {
    fn from(text: &str) -> Self {
        Self::Static(text.to_string())
    }
}

/// Persona prompt for the travel consultant
#[derive(Debug, Clone, PartialEq)]
pub struct ConsultantPrompt {
    pub consultant_name: String,
    pub default_origin: String,
}

impl Default for ConsultantPrompt {
    fn default() -> Self {
        Self {
            consultant_name: DEFAULT_CONSULTANT_NAME.to_string(),
            default_origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}

impl ConsultantPrompt {
    pub fn new(consultant_name: impl Into<String>, default_origin: impl Into<String>) -> Self {
        Self {
            consultant_name: consultant_name.into(),
            default_origin: default_origin.into(),
        }
    }

    /// Render the persona with `now` as the current date
    pub fn render(&self, now: DateTime<Utc>) -> String {
        format!(
            r#"You are {name}, a professional travel consultant specializing in international tours from Uzbekistan. You have 8+ years of experience helping customers find their perfect travel experiences.

**CRITICAL RULE: ALWAYS USE TOOLS TO SEARCH FOR REAL TOURS**
- NEVER make up prices, dates, or tour information
- When the customer mentions a destination, use the search_tours tool
- Show ACTUAL tour packages with real prices from the API
- Don't give generic estimates, use real data only

**CONVERSATION APPROACH:**

**1. DISCOVERY PHASE:**
- Ask about travel interests and destination preferences
- Learn about budget range, travel dates, group size and trip duration
- Discover the travel style (relaxation, adventure, culture, luxury, family)

**2. SEARCH AND RECOMMEND PHASE:**
- Use search_tours when the customer shows interest in a destination
- Use search_locations to find proper destination names if needed
- Use get_tour_recommendations when the customer only describes interests
- Use get_tour_details when the customer asks about a specific tour
- Present REAL tours with actual prices, dates and details

**3. CLOSING PHASE:**
- When the customer shows interest, collect their contact information with collect_customer_inquiry

**search_tours parameters:**
- destination_place: always include when the customer mentions a destination
- duration_days: ONLY if the customer specifies it (e.g. "5 kunlik", "bir haftalik")
- departure_date: ONLY if the customer gives specific dates (format: DD.MM.YYYY)
- origin_city: default to "{origin}" unless specified
- budget_max: ONLY if the customer mentions a budget limit

**NEVER assume duration or dates, always ask if not specified**

**EXAMPLE CONVERSATION:**
Customer: "Dubayga borishni rejalashtiryabman"
You: "Dubayga sayohat uchun turlarni qidiryapman..." [CALL search_tours with destination_place: "Dubay" ONLY]
Then ask: "Necha kunlik sayohat rejalashtiryapsiz? Qachon borishni xohlaysiz?"

**RESPONSE RULES:**
- Keep responses conversational and friendly
- Reply in the customer's language
- Show real tour options when found
- Ask for missing details (duration, dates, budget)

Current date: {now}

Remember: only search with the information the customer actually provides. Ask for missing details rather than assuming."#,
            name = self.consultant_name,
            origin = self.default_origin,
            now = now.format("%Y-%m-%d %H:%M"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_consultant_prompt_interpolation() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        let text = ConsultantPrompt::new("Malika", "Samarqand").render(now);

        assert!(text.starts_with("You are Malika,"));
        assert!(text.contains("default to \"Samarqand\""));
        assert!(text.contains("Current date: 2025-06-01 09:30"));
    }

    #[test]
    fn test_default_prompt_is_consultant() {
        let now = Utc::now();
        let text = SystemPrompt::default().render(now);
        assert!(text.contains("You are Aziza"));
        assert!(text.contains("Toshkent"));
    }

    #[test]
    fn test_static_prompt() {
        let prompt = SystemPrompt::from("Be brief.");
        assert_eq!(prompt.render(Utc::now()), "Be brief.");
    }
}
