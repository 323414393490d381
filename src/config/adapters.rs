//! Tool adapter configuration

use secrecy::Secret;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Settings shared by HTTP-backed tools
#[derive(Debug, Clone, Deserialize)]
pub struct AdaptersConfig {
    /// Key substituted for `${RAPIDAPI_KEY}` in tool headers
    pub rapidapi_key: Option<Secret<String>>,

    /// Timeout of a single HTTP tool call in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Retries of transient tool failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retries in milliseconds
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Extra tool catalog (YAML or JSON) loaded after the built-in tools
    pub catalog_path: Option<PathBuf>,
}

impl AdaptersConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.http_timeout_secs == 0 || self.http_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_retries > 5 {
            return Err(ValidationError::TooManyRetries);
        }
        Ok(())
    }
}

impl Default for AdaptersConfig {
    fn default() -> Self {
        Self {
            rapidapi_key: None,
            http_timeout_secs: default_http_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
            catalog_path: None,
        }
    }
}

fn default_http_timeout() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    1
}

fn default_retry_backoff() -> u64 {
    250
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapters_defaults() {
        let config = AdaptersConfig::default();
        assert_eq!(config.http_timeout(), Duration::from_secs(15));
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.retry_backoff(), Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_excessive_retries() {
        let config = AdaptersConfig {
            max_retries: 10,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::TooManyRetries));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = AdaptersConfig {
            http_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
    }
}
