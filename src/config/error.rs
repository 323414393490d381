//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid bind address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid log format '{0}' (expected 'text' or 'json')")]
    InvalidLogFormat(String),

    #[error("Step timeout must be between 1ms and 300000ms")]
    InvalidStepTimeout,

    #[error("Max concurrency must be between 1 and 64")]
    InvalidConcurrency,

    #[error("Invalid AI base URL")]
    InvalidAiBaseUrl,

    #[error("Adapter retries must not exceed 5")]
    TooManyRetries,
}
