//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod bootstrap;
pub mod handlers;

pub use bootstrap::{build_parser, BootstrapError, Services};
pub use handlers::{
    HandleQueryCommand, HandleQueryResult, ListToolsHandler, ListToolsQuery, QueryEngine,
    QueryError, RegisterToolCommand, RegisterToolHandler, RegisterToolResult,
    UnregisterToolCommand, UnregisterToolHandler, UnregisterToolResult,
};
