//! Axum router configuration for tools endpoints.

use axum::{
    routing::{delete, get},
    Router,
};

use super::handlers::{list_tools, register_tool, unregister_tool, ToolsAppState};

/// Create the tools API router.
///
/// # Routes
///
/// - `GET /tools` - List registered tools (query: format)
/// - `POST /tools` - Register a tool from a catalog entry
/// - `DELETE /tools/:name` - Remove a tool
pub fn tools_router(state: ToolsAppState) -> Router {
    Router::new()
        .route("/tools", get(list_tools).post(register_tool))
        .route("/tools/:name", delete(unregister_tool))
        .with_state(state)
}
