//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ToolAdapter` - Invokes one registered tool with resolved parameters
//! - `InvocationProposer` - Generative backend that proposes invocations
//! - `AIProvider` - Chat-completion provider used by the proposer

mod ai_provider;
mod invocation_proposer;
mod tool_adapter;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, TokenUsage,
};
pub use invocation_proposer::{InvocationProposer, ProposedInvocation, ProposerError};
pub use tool_adapter::{AdapterError, ResolvedCall, ToolAdapter};
