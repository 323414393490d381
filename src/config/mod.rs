//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TOOL_ORCHESTRATOR` prefix and nested values use double underscores as
//! separators. Every section has defaults, so an empty environment is a valid
//! pattern-only setup.
//!
//! # Example
//!
//! ```no_run
//! use tool_orchestrator::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod adapters;
mod ai;
mod engine;
mod error;
mod parser;
mod server;

pub use adapters::AdaptersConfig;
pub use ai::AiConfig;
pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use parser::ParserConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Executor limits
    #[serde(default)]
    pub engine: EngineConfig,

    /// Intent parser strategy and priority
    #[serde(default)]
    pub parser: ParserConfig,

    /// Generative backend
    #[serde(default)]
    pub ai: AiConfig,

    /// Tool adapters and catalog
    #[serde(default)]
    pub adapters: AdaptersConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TOOL_ORCHESTRATOR` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TOOL_ORCHESTRATOR__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TOOL_ORCHESTRATOR__PARSER__STRATEGY=hybrid` -> `parser.strategy = hybrid`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TOOL_ORCHESTRATOR")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid, or if
    /// a generative parser strategy is selected without an AI key.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.engine.validate()?;
        self.ai.validate(self.parser.needs_generative())?;
        self.adapters.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intent::ParserStrategy;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "TOOL_ORCHESTRATOR__SERVER__PORT",
        "TOOL_ORCHESTRATOR__SERVER__ENVIRONMENT",
        "TOOL_ORCHESTRATOR__ENGINE__MAX_CONCURRENCY",
        "TOOL_ORCHESTRATOR__ENGINE__STEP_TIMEOUT_MS",
        "TOOL_ORCHESTRATOR__PARSER__STRATEGY",
        "TOOL_ORCHESTRATOR__PARSER__PRIORITY",
        "TOOL_ORCHESTRATOR__AI__API_KEY",
        "TOOL_ORCHESTRATOR__ADAPTERS__RAPIDAPI_KEY",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engine.max_concurrency, 4);
        assert_eq!(config.parser.strategy, ParserStrategy::Pattern);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_values_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TOOL_ORCHESTRATOR__SERVER__PORT", "3000");
        env::set_var("TOOL_ORCHESTRATOR__ENGINE__MAX_CONCURRENCY", "2");
        env::set_var("TOOL_ORCHESTRATOR__ENGINE__STEP_TIMEOUT_MS", "500");
        env::set_var("TOOL_ORCHESTRATOR__PARSER__PRIORITY", "news,weather");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.engine.max_concurrency, 2);
        assert_eq!(config.engine.step_timeout_ms, 500);
        assert_eq!(config.parser.priority_list(), vec!["news", "weather"]);
    }

    #[test]
    fn test_generative_strategy_requires_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TOOL_ORCHESTRATOR__PARSER__STRATEGY", "hybrid");
        let without_key = AppConfig::load();
        env::set_var("TOOL_ORCHESTRATOR__AI__API_KEY", "sk-test");
        let with_key = AppConfig::load();
        clear_env();

        assert_eq!(
            without_key.unwrap().validate(),
            Err(ValidationError::MissingRequired("AI__API_KEY"))
        );
        assert!(with_key.unwrap().validate().is_ok());
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TOOL_ORCHESTRATOR__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }
}
