//! Intent parser contract and parse outcome.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{IntentError, Invocation, ParserError};
use crate::domain::foundation::InvocationId;
use crate::domain::registry::ToolRegistry;

/// Turns query text into tool invocations.
///
/// Implementations must only return invocations naming tools present in
/// the registry snapshot they were given, with parameters validated
/// against that tool's spec.
#[async_trait]
pub trait IntentParser: Send + Sync {
    async fn parse(&self, text: &str, registry: &ToolRegistry) -> Result<ParseOutcome, ParserError>;

    /// Strategy label for logs.
    fn strategy(&self) -> ParserStrategy;
}

/// Which parser the engine is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserStrategy {
    /// Phrase templates only.
    #[default]
    Pattern,
    /// Generative backend only.
    Generative,
    /// Phrase templates, falling back to the generative backend.
    Hybrid,
}

impl std::fmt::Display for ParserStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pattern => "pattern",
            Self::Generative => "generative",
            Self::Hybrid => "hybrid",
        };
        f.write_str(label)
    }
}

/// A sub-intent that matched a tool but could not become an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedIntent {
    /// Id the invocation would have had.
    pub id: InvocationId,
    pub text: String,
    pub error: IntentError,
}

/// Result of parsing one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub invocations: Vec<Invocation>,
    pub rejected: Vec<RejectedIntent>,
    /// Clauses no tool recognised.
    pub unmatched: Vec<String>,
}

impl ParseOutcome {
    /// True if the parser found nothing at all to work with.
    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty() && self.rejected.is_empty()
    }

    /// Rejects invocations that reference a rejected or missing invocation,
    /// repeating until no such reference remains.
    pub fn prune_dangling_references(&mut self) {
        loop {
            let live: HashSet<InvocationId> = self.invocations.iter().map(Invocation::id).collect();
            let dead: HashSet<InvocationId> = self.rejected.iter().map(|r| r.id).collect();

            let position = self.invocations.iter().position(|inv| {
                inv.dependencies()
                    .iter()
                    .any(|dep| dead.contains(dep) || (!live.contains(dep) && *dep != inv.id()))
            });
            let Some(position) = position else { break };

            let invocation = self.invocations.remove(position);
            let step = invocation
                .dependencies()
                .into_iter()
                .find(|dep| dead.contains(dep) || !live.contains(dep))
                .unwrap_or_else(|| invocation.id());
            self.rejected.push(RejectedIntent {
                id: invocation.id(),
                text: invocation.source().to_string(),
                error: IntentError::DependsOnRejected { step },
            });
        }
        self.rejected.sort_by_key(|r| r.id);
    }
}
