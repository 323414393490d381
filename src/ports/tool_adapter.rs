//! Tool Adapter Port - Interface for invoking a single registered tool.
//!
//! The executor never talks to an external service directly. Every tool in
//! the registry is bound to an adapter implementing this port, and the
//! executor hands it a fully resolved call: all references to earlier steps
//! have already been replaced by concrete values.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//! use tool_orchestrator::ports::{AdapterError, ResolvedCall, ToolAdapter};
//!
//! struct EchoAdapter;
//!
//! #[async_trait]
//! impl ToolAdapter for EchoAdapter {
//!     async fn invoke(&self, call: &ResolvedCall) -> Result<serde_json::Value, AdapterError> {
//!         Ok(serde_json::Value::Object(call.parameters.clone()))
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Port for invoking one tool.
///
/// Implementations must be safe to call concurrently; the executor may run
/// several invocations of the same adapter at once.
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    /// Invoke the tool and return its payload.
    ///
    /// The payload is expected to be a JSON object containing at least the
    /// output fields declared by the tool's spec.
    async fn invoke(&self, call: &ResolvedCall) -> Result<Value, AdapterError>;

    /// Short label for logs.
    fn kind(&self) -> &'static str {
        "adapter"
    }
}

/// A tool call whose parameters are all literal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCall {
    pub tool: String,
    pub parameters: Map<String, Value>,
}

impl ResolvedCall {
    pub fn new(tool: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            tool: tool.into(),
            parameters,
        }
    }

    /// Returns a parameter as a string slice, if present and a string.
    pub fn str_param(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).and_then(Value::as_str)
    }

    /// Returns a parameter as f64, if present and numeric.
    pub fn number_param(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).and_then(Value::as_f64)
    }
}

/// Errors an adapter can report.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdapterError {
    #[error("Tool call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Tool service unavailable: {0}")]
    Unavailable(String),

    #[error("Tool service rejected the call ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Malformed tool response: {0}")]
    MalformedResponse(String),

    #[error("Adapter not configured: {0}")]
    NotConfigured(String),
}

impl AdapterError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Whether a retry of the same call might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Unavailable(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
