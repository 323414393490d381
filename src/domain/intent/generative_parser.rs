//! Generative intent parser.
//!
//! Delegates tool selection and slot filling to an [`InvocationProposer`],
//! then holds every proposal to the same rules as the pattern parser:
//! unknown tools and undeclared or mistyped parameters are rejected.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::slots::{validate_slots, RawSlot, ReferenceContext};
use super::{
    IntentError, IntentParser, Invocation, ParseOutcome, ParserError, ParserStrategy, Reference,
    RejectedIntent,
};
use crate::domain::foundation::InvocationId;
use crate::domain::registry::{ToolRegistry, ToolSpec};
use crate::ports::{InvocationProposer, ProposedInvocation, ProposerError};

const REFERENCE_KEY: &str = "$ref";

#[derive(Deserialize)]
struct WireReference {
    step: usize,
    field: String,
}

pub struct GenerativeIntentParser {
    proposer: Arc<dyn InvocationProposer>,
}

impl GenerativeIntentParser {
    pub fn new(proposer: Arc<dyn InvocationProposer>) -> Self {
        Self { proposer }
    }

    fn convert(
        &self,
        index: usize,
        proposal: ProposedInvocation,
        count: usize,
        query: &str,
        registry: &ToolRegistry,
    ) -> Result<Invocation, RejectedIntent> {
        let id = InvocationId::new(index);
        let source = proposal.text.unwrap_or_else(|| query.to_string());
        let reject = |error: IntentError| RejectedIntent {
            id,
            text: source.clone(),
            error,
        };

        let spec = registry.lookup(&proposal.tool).map_err(|_| {
            warn!(tool = %proposal.tool, "Proposer named an unregistered tool");
            reject(IntentError::UnknownTool {
                tool: proposal.tool.clone(),
            })
        })?;

        let raw = raw_slots(spec, proposal.parameters, count).map_err(&reject)?;
        let parameters =
            validate_slots(spec, raw, ReferenceContext::default()).map_err(&reject)?;

        Ok(Invocation::new(id, spec.name(), parameters, source.clone()))
    }
}

fn raw_slots(
    spec: &ToolSpec,
    parameters: Map<String, Value>,
    count: usize,
) -> Result<BTreeMap<String, RawSlot>, IntentError> {
    parameters
        .into_iter()
        .map(|(name, value)| {
            let slot = match value.get(REFERENCE_KEY) {
                Some(wire) => {
                    let wire: WireReference = serde_json::from_value(wire.clone()).map_err(|e| {
                        IntentError::extraction(spec.name(), &name, format!("malformed reference: {}", e))
                    })?;
                    if wire.step >= count {
                        return Err(IntentError::extraction(
                            spec.name(),
                            &name,
                            format!("reference to step {} which was not proposed", wire.step),
                        ));
                    }
                    RawSlot::Reference(Reference::new(InvocationId::new(wire.step), wire.field))
                }
                None => RawSlot::Value(value),
            };
            Ok((name, slot))
        })
        .collect()
}

#[async_trait]
impl IntentParser for GenerativeIntentParser {
    async fn parse(&self, text: &str, registry: &ToolRegistry) -> Result<ParseOutcome, ParserError> {
        let tools: Vec<ToolSpec> = registry.list_all().cloned().collect();

        let proposals = self
            .proposer
            .propose(text, &tools)
            .await
            .map_err(|e| match e {
                ProposerError::Unavailable(msg) => ParserError::ProposerUnavailable(msg),
                ProposerError::MalformedReply(msg) => ParserError::MalformedReply(msg),
            })?;

        debug!(proposals = proposals.len(), "Received invocation proposals");

        let count = proposals.len();
        let mut outcome = ParseOutcome::default();
        for (index, proposal) in proposals.into_iter().enumerate() {
            match self.convert(index, proposal, count, text, registry) {
                Ok(invocation) => outcome.invocations.push(invocation),
                Err(rejected) => outcome.rejected.push(rejected),
            }
        }
        if outcome.is_empty() {
            outcome.unmatched.push(text.to_string());
        }

        outcome.prune_dangling_references();
        Ok(outcome)
    }

    fn strategy(&self) -> ParserStrategy {
        ParserStrategy::Generative
    }
}
