//! Tracing subscriber setup for the binary

use crate::config::LoggingSettings;
use crate::error::AgentError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Directive used when `RUST_LOG` is unset
pub fn default_directive(level: &str) -> String {
    format!("safar={level},tower_http={level},teloxide=warn,{level}", level = level)
}

/// Install the global subscriber; `RUST_LOG` overrides the configured level
pub fn init_logging(settings: &LoggingSettings) -> Result<(), AgentError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&settings.level)));

    let fmt_layer = if settings.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AgentError::Configuration(format!("logging already initialised: {}", e)))
}
