//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - OpenAI chat completions and the invocation proposer built on it
//! - `catalog` - Declarative tool definitions and adapter construction
//! - `http` - Axum REST API
//! - `tools` - Tool adapters (HTTP templates, calculator, retry, mock)

pub mod ai;
pub mod catalog;
pub mod http;
pub mod tools;
