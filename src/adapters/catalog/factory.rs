//! Builds the adapter bound to a catalog entry.

use reqwest::Client;
use secrecy::Secret;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::{Backend, BuiltinTool, CatalogEntry, CatalogError};
use crate::adapters::tools::{CalculatorAdapter, HttpToolAdapter, RetryingToolAdapter};
use crate::config::AdaptersConfig;
use crate::ports::ToolAdapter;

/// Secret name available to header templates as `${RAPIDAPI_KEY}`.
pub const RAPIDAPI_KEY: &str = "RAPIDAPI_KEY";

#[derive(Clone)]
pub struct AdapterFactory {
    client: Client,
    secrets: Arc<HashMap<String, Secret<String>>>,
    call_timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl AdapterFactory {
    pub fn new(client: Client, call_timeout: Duration) -> Self {
        Self {
            client,
            secrets: Arc::new(HashMap::new()),
            call_timeout,
            max_retries: 0,
            retry_backoff: Duration::ZERO,
        }
    }

    pub fn from_config(config: &AdaptersConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| CatalogError::Client(e.to_string()))?;

        let mut factory = Self::new(client, config.http_timeout())
            .with_retries(config.max_retries, config.retry_backoff());
        if let Some(key) = &config.rapidapi_key {
            factory = factory.with_secret(RAPIDAPI_KEY, key.clone());
        }
        Ok(factory)
    }

    pub fn with_secret(mut self, name: impl Into<String>, value: Secret<String>) -> Self {
        Arc::make_mut(&mut self.secrets).insert(name.into(), value);
        self
    }

    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    /// Creates the adapter for `entry`.
    ///
    /// HTTP tools whose headers need a secret that is not configured are
    /// still built; their calls fail with `NotConfigured`.
    pub fn build(&self, entry: &CatalogEntry) -> Result<Arc<dyn ToolAdapter>, CatalogError> {
        match entry.backend()? {
            Backend::Builtin(BuiltinTool::Calculator) => Ok(Arc::new(CalculatorAdapter::new())),
            Backend::Http(template) => {
                for secret in template.required_secrets() {
                    if !self.secrets.contains_key(&secret) {
                        warn!(tool = entry.name(), secret = %secret, "Tool secret not configured");
                    }
                }

                let http: Arc<dyn ToolAdapter> = Arc::new(HttpToolAdapter::new(
                    template.clone(),
                    self.client.clone(),
                    Arc::clone(&self.secrets),
                    self.call_timeout,
                ));

                if self.max_retries == 0 {
                    Ok(http)
                } else {
                    Ok(Arc::new(RetryingToolAdapter::new(
                        http,
                        self.max_retries,
                        self.retry_backoff,
                    )))
                }
            }
        }
    }
}
