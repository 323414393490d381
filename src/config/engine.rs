//! Execution engine configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::execution::ExecutorConfig;

/// Executor limits
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Per-step adapter timeout in milliseconds
    #[serde(default = "default_step_timeout")]
    pub step_timeout_ms: u64,

    /// Maximum concurrent adapter calls per query
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl EngineConfig {
    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            step_timeout: self.step_timeout(),
            max_concurrency: self.max_concurrency,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.step_timeout_ms == 0 || self.step_timeout_ms > 300_000 {
            return Err(ValidationError::InvalidStepTimeout);
        }
        if self.max_concurrency == 0 || self.max_concurrency > 64 {
            return Err(ValidationError::InvalidConcurrency);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_timeout_ms: default_step_timeout(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_step_timeout() -> u64 {
    10_000
}

fn default_max_concurrency() -> usize {
    4
}
