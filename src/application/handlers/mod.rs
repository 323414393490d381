//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod query;
pub mod tools;

pub use query::{HandleQueryCommand, HandleQueryResult, QueryEngine, QueryError};
pub use tools::{
    ListToolsHandler, ListToolsQuery, RegisterToolCommand, RegisterToolHandler,
    RegisterToolResult, UnregisterToolCommand, UnregisterToolHandler, UnregisterToolResult,
};
