//! HTTP adapters - REST API implementations.
//!
//! Each surface has its own module; [`api_router`] merges them with the
//! health check.

pub mod chat;
pub mod error;
pub mod tools;

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::application::handlers::tools::{
    ListToolsHandler, RegisterToolHandler, UnregisterToolHandler,
};
use crate::application::Services;
use crate::domain::registry::SharedToolRegistry;

pub use chat::{chat_router, ChatAppState};
pub use error::ErrorResponse;
pub use tools::{tools_router, ToolsAppState};

/// Builds the complete API router over shared services.
pub fn api_router(services: &Services) -> Router {
    let chat_state = ChatAppState {
        query_engine: services.query_engine.clone(),
    };

    let tools_state = ToolsAppState {
        list_handler: Arc::new(ListToolsHandler::new(services.registry.clone())),
        register_handler: Arc::new(RegisterToolHandler::new(
            services.registry.clone(),
            services.book.clone(),
            services.factory.clone(),
        )),
        unregister_handler: Arc::new(UnregisterToolHandler::new(
            services.registry.clone(),
            services.book.clone(),
        )),
    };

    Router::new()
        .route("/health", get(health))
        .with_state(services.registry.clone())
        .merge(chat_router(chat_state))
        .merge(tools_router(tools_state))
}

/// GET /health
async fn health(State(registry): State<Arc<SharedToolRegistry>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "tools": registry.snapshot().len(),
    }))
}
