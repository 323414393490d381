//! AI Provider Adapters.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - OpenAI-compatible chat completions
//! - `MockAIProvider` - Configurable mock for testing
//! - `AiInvocationProposer` - Turns a provider into an `InvocationProposer`

mod invocation_proposer;
mod mock_provider;
mod openai_provider;

pub use invocation_proposer::AiInvocationProposer;
pub use mock_provider::MockAIProvider;
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
