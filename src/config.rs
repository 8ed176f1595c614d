//! Runtime settings
//!
//! Loaded from `config/default.*`, then `config/{env}.*`, then `SAFAR__*`
//! environment variables (e.g. `SAFAR__SERVER__PORT=8080`). The deployment
//! variables the service has always used (`OPENAI_API_KEY`,
//! `TELEGRAM_BOT_TOKEN`, `CHATWOOT_*`, ...) fill settings left unset.

use crate::error::AgentError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub catalog: CatalogSettings,
    pub agent: AgentSettings,
    pub chatwoot: ChatwootSettings,
    pub telegram: TelegramSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5005,
            cors_enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub model: String,
    pub temperature: f32,
    pub api_key: Option<String>,
    /// OpenAI-compatible endpoint override
    pub api_base: Option<String>,
    pub max_tool_rounds: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            api_key: None,
            api_base: None,
            max_tool_rounds: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub base_url: String,
    pub locations_timeout_secs: u64,
    pub tours_timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: crate::catalog::client::DEFAULT_BASE_URL.to_string(),
            locations_timeout_secs: 10,
            tours_timeout_secs: 15,
        }
    }
}

impl CatalogSettings {
    pub fn locations_timeout(&self) -> Duration {
        Duration::from_secs(self.locations_timeout_secs)
    }

    pub fn tours_timeout(&self) -> Duration {
        Duration::from_secs(self.tours_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub max_context_messages: usize,
    pub tool_timeout_secs: u64,
    pub consultant_name: String,
    pub default_origin: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_context_messages: 100,
            tool_timeout_secs: 30,
            consultant_name: crate::prompt::DEFAULT_CONSULTANT_NAME.to_string(),
            default_origin: crate::prompt::DEFAULT_ORIGIN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatwootSettings {
    pub base_url: String,
    pub api_token: Option<String>,
    pub account_id: u64,
}

impl Default for ChatwootSettings {
    fn default() -> Self {
        Self {
            base_url: "https://app.chatwoot.com".to_string(),
            api_token: None,
            account_id: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub bot_token: Option<String>,
    /// Chat receiving lead notifications
    pub leads_chat_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<(), AgentError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid("llm.temperature", "must be between 0.0 and 2.0"));
        }
        if self.llm.max_tool_rounds == 0 {
            return Err(invalid("llm.max_tool_rounds", "must be at least 1"));
        }
        if self.agent.tool_timeout_secs == 0 {
            return Err(invalid("agent.tool_timeout_secs", "must be positive"));
        }
        if self.catalog.locations_timeout_secs == 0 || self.catalog.tours_timeout_secs == 0 {
            return Err(invalid("catalog timeouts", "must be positive"));
        }
        if self.agent.max_context_messages == 0 {
            return Err(invalid("agent.max_context_messages", "must be at least 1"));
        }
        Ok(())
    }

    /// Fill unset secrets from the conventional deployment variables
    pub fn apply_well_known_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.llm.api_key.is_none() {
            self.llm.api_key = get("OPENAI_API_KEY");
        }
        if self.telegram.bot_token.is_none() {
            self.telegram.bot_token = get("TELEGRAM_BOT_TOKEN");
        }
        if self.telegram.leads_chat_id.is_none() {
            self.telegram.leads_chat_id = get("TELEGRAM_CHAT_ID").and_then(|v| v.trim().parse().ok());
        }
        if let Some(url) = get("CHATWOOT_BASE_URL") {
            self.chatwoot.base_url = url;
        }
        if self.chatwoot.api_token.is_none() {
            self.chatwoot.api_token = get("CHATWOOT_API_TOKEN");
        }
        if let Some(id) = get("CHATWOOT_ACCOUNT_ID").and_then(|v| v.trim().parse().ok()) {
            self.chatwoot.account_id = id;
        }
    }
}

fn invalid(field: &str, message: &str) -> AgentError {
    AgentError::Configuration(format!("{} {}", field, message))
}

/// Load settings for the optional environment name
pub fn load_settings(env: Option<&str>) -> Result<Settings, AgentError> {
    let mut builder = Config::builder()
        .add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("SAFAR")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| AgentError::Configuration(e.to_string()))?;
    let mut settings: Settings = config
        .try_deserialize()
        .map_err(|e| AgentError::Configuration(e.to_string()))?;

    settings.apply_well_known_env(|name| std::env::var(name).ok());
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5005);
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        assert_eq!(settings.catalog.tours_timeout(), Duration::from_secs(15));
        assert_eq!(settings.agent.consultant_name, "Aziza");
        assert_eq!(settings.chatwoot.account_id, 1);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        settings.llm.temperature = 2.5;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.llm.max_tool_rounds = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.agent.tool_timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_well_known_env() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-test"),
            ("TELEGRAM_CHAT_ID", "-100200300"),
            ("CHATWOOT_ACCOUNT_ID", "42"),
            ("CHATWOOT_API_TOKEN", ""),
        ]);
        let mut settings = Settings::default();
        settings.apply_well_known_env(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(settings.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.telegram.leads_chat_id, Some(-100200300));
        assert_eq!(settings.chatwoot.account_id, 42);
        assert!(settings.chatwoot.api_token.is_none());
    }

    #[test]
    fn test_explicit_setting_wins_over_env() {
        let mut settings = Settings::default();
        settings.llm.api_key = Some("from-config".to_string());
        settings.apply_well_known_env(|_| Some("from-env".to_string()));
        assert_eq!(settings.llm.api_key.as_deref(), Some("from-config"));
    }

    #[test]
    fn test_partial_section_deserializes_with_defaults() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "server": {"port": 8080}
        }))
        .unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.logging.level, "info");
    }
}
