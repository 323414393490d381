//! Axum router configuration for the chat endpoint.

use axum::{routing::post, Router};

use super::handlers::{chat, ChatAppState};

/// Create the chat router.
///
/// # Routes
///
/// - `POST /chat` - Answer a query (body: `{"message": "..."}`)
pub fn chat_router(state: ChatAppState) -> Router {
    Router::new().route("/chat", post(chat)).with_state(state)
}
