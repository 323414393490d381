//! LLM-backed invocation proposer.
//!
//! Asks a chat-completion model to split a query into tool invocations and
//! reply with a bare JSON array. The reply is only decoded here; the
//! generative intent parser validates it against the registry.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::registry::ToolSpec;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, InvocationProposer, MessageRole, ProposedInvocation,
    ProposerError,
};

const INSTRUCTIONS: &str = "\
You translate a user request into calls to the tools listed below.
Reply with a JSON array and nothing else. Each element is
{\"tool\": <tool name>, \"parameters\": {<name>: <value>}, \"text\": <the words this call covers>}.
List calls in the order they should run. When a parameter should take the
output of an earlier call, use {\"$ref\": {\"step\": <index of that call in your array>, \"field\": <output field>}}.
Only use tools, parameters and output fields that appear below.
If no tool applies, reply with [].";

pub struct AiInvocationProposer {
    provider: Arc<dyn AIProvider>,
    max_tokens: u32,
}

impl AiInvocationProposer {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            max_tokens: 1024,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn system_prompt(tools: &[ToolSpec]) -> String {
        let catalog: Vec<Value> = tools.iter().map(ToolSpec::to_openai_format).collect();
        format!(
            "{}\n\nTools:\n{}",
            INSTRUCTIONS,
            serde_json::to_string_pretty(&catalog).unwrap_or_default()
        )
    }

    /// Decodes the model reply, tolerating a surrounding code fence.
    fn decode(content: &str) -> Result<Vec<ProposedInvocation>, ProposerError> {
        let body = strip_fence(content.trim());
        serde_json::from_str(body).map_err(|e| ProposerError::MalformedReply(e.to_string()))
    }
}

fn strip_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    // Drop the language tag line, e.g. ```json
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

impl From<AIError> for ProposerError {
    fn from(err: AIError) -> Self {
        match err {
            AIError::Parse(msg) => ProposerError::MalformedReply(msg),
            other => ProposerError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl InvocationProposer for AiInvocationProposer {
    async fn propose(
        &self,
        text: &str,
        tools: &[ToolSpec],
    ) -> Result<Vec<ProposedInvocation>, ProposerError> {
        let request = CompletionRequest::new()
            .with_system_prompt(Self::system_prompt(tools))
            .with_message(MessageRole::User, text)
            .with_max_tokens(self.max_tokens)
            .with_temperature(0.0);

        let completion = self.provider.complete(request).await.map_err(|e| {
            warn!(error = %e, provider = %self.provider.provider_info().name, "Proposer call failed");
            ProposerError::from(e)
        })?;

        let proposals = Self::decode(&completion.content)?;
        debug!(count = proposals.len(), model = %completion.model, "Invocations proposed");
        Ok(proposals)
    }
}
