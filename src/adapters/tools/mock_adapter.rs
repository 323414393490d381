//! Mock tool adapter for testing.
//!
//! # Features
//!
//! - Queued responses, consumed in order
//! - Echo of the call parameters once the queue is empty
//! - Simulated latency for timeout and concurrency tests
//! - Call and completion recording for verification

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AdapterError, ResolvedCall, ToolAdapter};

#[derive(Debug, Clone, Default)]
pub struct MockToolAdapter {
    responses: Arc<Mutex<VecDeque<Result<Value, AdapterError>>>>,
    fallback: Option<Value>,
    delay: Duration,
    calls: Arc<Mutex<Vec<ResolvedCall>>>,
    completed: Arc<AtomicUsize>,
}

impl MockToolAdapter {
    /// A mock that echoes its parameters back as the payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that always returns `payload` once the queue is empty.
    pub fn always(payload: Value) -> Self {
        Self {
            fallback: Some(payload),
            ..Self::default()
        }
    }

    pub fn with_response(self, payload: Value) -> Self {
        self.push(Ok(payload));
        self
    }

    pub fn with_error(self, error: AdapterError) -> Self {
        self.push(Err(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<ResolvedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Calls that ran to the end of their delay.
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn push(&self, response: Result<Value, AdapterError>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }
}

#[async_trait]
impl ToolAdapter for MockToolAdapter {
    async fn invoke(&self, call: &ResolvedCall) -> Result<Value, AdapterError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        let queued = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match queued {
            Some(response) => response,
            None => Ok(self
                .fallback
                .clone()
                .unwrap_or_else(|| Value::Object(call.parameters.clone()))),
        }
    }

    fn kind(&self) -> &'static str {
        "mock"
    }
}
