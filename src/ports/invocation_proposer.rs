//! Invocation Proposer Port - Generative backend for intent parsing.
//!
//! Given query text and the registered tool specs, a proposer returns the
//! tool invocations it believes the user asked for. Its output is untrusted:
//! the generative parser validates every proposal against the registry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::registry::ToolSpec;

#[async_trait]
pub trait InvocationProposer: Send + Sync {
    /// Proposes invocations for `text`, in execution order.
    ///
    /// A parameter may be a literal or a reference object of the form
    /// `{"$ref": {"step": <index into the returned list>, "field": "<output>"}}`.
    async fn propose(
        &self,
        text: &str,
        tools: &[ToolSpec],
    ) -> Result<Vec<ProposedInvocation>, ProposerError>;
}

/// One invocation as proposed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedInvocation {
    pub tool: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// The part of the query this proposal covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ProposedInvocation {
    pub fn new(tool: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            tool: tool.into(),
            parameters,
            text: None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProposerError {
    #[error("Proposer unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed proposer reply: {0}")]
    MalformedReply(String),
}
