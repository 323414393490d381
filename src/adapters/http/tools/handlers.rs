//! HTTP handlers for tools endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::catalog::{CatalogEntry, CatalogError};
use crate::adapters::http::error::ErrorResponse;
use crate::application::handlers::tools::{
    ListToolsHandler, ListToolsQuery, RegisterToolCommand, RegisterToolHandler,
    UnregisterToolCommand, UnregisterToolHandler,
};
use crate::domain::registry::RegistryError;

use super::dto::{ListToolsParams, ListToolsResponse, ToolCommandResponse};

/// Application state for tools endpoints.
#[derive(Clone)]
pub struct ToolsAppState {
    pub list_handler: Arc<ListToolsHandler>,
    pub register_handler: Arc<RegisterToolHandler>,
    pub unregister_handler: Arc<UnregisterToolHandler>,
}

/// List registered tools.
///
/// GET /tools?format=openai
pub async fn list_tools(
    State(state): State<ToolsAppState>,
    Query(params): Query<ListToolsParams>,
) -> impl IntoResponse {
    let tools = state.list_handler.handle(ListToolsQuery);
    let count = tools.len();

    let tools_json = match params.format.as_str() {
        "openai" => serde_json::Value::Array(tools.iter().map(|t| t.to_openai_format()).collect()),
        _ => serde_json::to_value(&tools).unwrap_or(serde_json::Value::Array(vec![])),
    };

    Json(ListToolsResponse {
        format: params.format,
        count,
        tools: tools_json,
    })
}

/// Register a tool from a catalog entry.
///
/// POST /tools
pub async fn register_tool(
    State(state): State<ToolsAppState>,
    Json(entry): Json<CatalogEntry>,
) -> Response {
    match state.register_handler.handle(RegisterToolCommand { entry }) {
        Ok(result) => (
            StatusCode::CREATED,
            Json(ToolCommandResponse {
                name: result.spec.name().to_string(),
                message: format!("Tool registered with {} phrase templates", result.patterns),
            }),
        )
            .into_response(),
        Err(e) => handle_catalog_error(e),
    }
}

/// Remove a tool.
///
/// DELETE /tools/:name
pub async fn unregister_tool(
    State(state): State<ToolsAppState>,
    Path(name): Path<String>,
) -> Response {
    match state
        .unregister_handler
        .handle(UnregisterToolCommand { name: name.clone() })
    {
        Ok(_) => (
            StatusCode::OK,
            Json(ToolCommandResponse {
                name,
                message: "Tool unregistered".to_string(),
            }),
        )
            .into_response(),
        Err(e) => handle_registry_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_registry_error(error: RegistryError) -> Response {
    match error {
        RegistryError::DuplicateTool(_) => {
            ErrorResponse::conflict(error.to_string()).into_response_with(StatusCode::CONFLICT)
        }
        RegistryError::UnknownTool(ref name) => {
            ErrorResponse::not_found("Tool", name).into_response_with(StatusCode::NOT_FOUND)
        }
        RegistryError::InvalidSpec { .. } => ErrorResponse::bad_request(error.to_string())
            .into_response_with(StatusCode::BAD_REQUEST),
    }
}

fn handle_catalog_error(error: CatalogError) -> Response {
    match error {
        CatalogError::Registry(e) => handle_registry_error(e),
        CatalogError::AdapterChoice { .. } | CatalogError::Pattern { .. } => {
            ErrorResponse::bad_request(error.to_string())
                .into_response_with(StatusCode::BAD_REQUEST)
        }
        other => ErrorResponse::internal(other.to_string())
            .into_response_with(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
