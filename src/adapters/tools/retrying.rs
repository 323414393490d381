//! Retry wrapper for tool adapters.
//!
//! Repeats the identical call when the inner adapter reports a transient
//! failure (see [`AdapterError::is_retryable`]). Non-transient errors and
//! the final attempt's error are returned unchanged.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::ports::{AdapterError, ResolvedCall, ToolAdapter};

pub struct RetryingToolAdapter {
    inner: Arc<dyn ToolAdapter>,
    max_retries: u32,
    backoff: Duration,
}

impl RetryingToolAdapter {
    pub fn new(inner: Arc<dyn ToolAdapter>, max_retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            backoff,
        }
    }
}

#[async_trait]
impl ToolAdapter for RetryingToolAdapter {
    async fn invoke(&self, call: &ResolvedCall) -> Result<Value, AdapterError> {
        let mut attempt = 0;

        loop {
            match self.inner.invoke(call).await {
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(tool = %call.tool, attempt, error = %err, "Retrying tool call");
                    sleep(self.backoff).await;
                }
                result => return result,
            }
        }
    }

    fn kind(&self) -> &'static str {
        self.inner.kind()
    }
}
