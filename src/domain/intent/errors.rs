//! Error types for intent parsing

use serde::Serialize;

use crate::domain::foundation::InvocationId;

/// Why a single sub-intent was rejected.
///
/// These never abort the whole parse; the sub-intent is reported alongside
/// the invocations that did parse.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntentError {
    #[error("Unknown tool: {tool}")]
    UnknownTool { tool: String },

    #[error("Cannot extract parameter '{parameter}' for {tool}: {reason}")]
    ParameterExtraction {
        tool: String,
        parameter: String,
        reason: String,
    },

    #[error("Depends on rejected {step}")]
    DependsOnRejected { step: InvocationId },
}

impl IntentError {
    pub fn extraction(
        tool: impl Into<String>,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ParameterExtraction {
            tool: tool.into(),
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a parser as a whole.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ParserError {
    #[error("Invocation proposer unavailable: {0}")]
    ProposerUnavailable(String),

    #[error("Invocation proposer returned an unusable reply: {0}")]
    MalformedReply(String),
}
