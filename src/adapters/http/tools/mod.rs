//! Tools HTTP adapter - REST API for the tool registry.
//!
//! Provides endpoints for:
//! - Listing registered tools
//! - Registering a tool from a catalog entry
//! - Removing a tool

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;

pub use handlers::ToolsAppState;
pub use routes::tools_router;
