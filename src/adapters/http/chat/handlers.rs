//! HTTP handlers for the chat endpoint.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::adapters::http::error::ErrorResponse;
use crate::application::handlers::query::{HandleQueryCommand, QueryEngine, QueryError};
use crate::domain::intent::ParserError;

use super::dto::{ChatRequest, ChatResponse};

#[derive(Clone)]
pub struct ChatAppState {
    pub query_engine: Arc<QueryEngine>,
}

/// POST /chat - Answer a natural-language query
///
/// Partial failures are still 200; the per-step outcome is in the body.
/// If the client goes away, steps not yet started are cancelled while
/// adapter calls already in flight run to completion.
pub async fn chat(State(state): State<ChatAppState>, Json(req): Json<ChatRequest>) -> Response {
    let cancel = CancellationToken::new();
    let _disconnect = cancel.clone().drop_guard();

    match state
        .query_engine
        .handle_with_cancel(HandleQueryCommand::new(req.message), cancel)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(ChatResponse::from(result))).into_response(),
        Err(e) => handle_query_error(e),
    }
}

fn handle_query_error(error: QueryError) -> Response {
    match error {
        QueryError::EmptyQuery => ErrorResponse::new("EMPTY_QUERY", error.to_string())
            .into_response_with(StatusCode::BAD_REQUEST),
        QueryError::NoToolMatched {
            ref rejected,
            ref unmatched,
        } => ErrorResponse::new("NO_TOOL_MATCHED", error.to_string())
            .with_details(json!({
                "rejected": rejected,
                "unmatched": unmatched,
            }))
            .into_response_with(StatusCode::BAD_REQUEST),
        QueryError::Planning(ref e) => ErrorResponse::new("PLAN_FAILED", e.to_string())
            .into_response_with(StatusCode::UNPROCESSABLE_ENTITY),
        QueryError::Parser(ParserError::ProposerUnavailable(ref reason)) => {
            warn!(%reason, "Generative parser unavailable");
            ErrorResponse::new("PARSER_UNAVAILABLE", error.to_string())
                .into_response_with(StatusCode::SERVICE_UNAVAILABLE)
        }
        QueryError::Parser(ParserError::MalformedReply(ref reason)) => {
            warn!(%reason, "Generative parser returned a malformed reply");
            ErrorResponse::new("PARSER_BAD_REPLY", error.to_string())
                .into_response_with(StatusCode::BAD_GATEWAY)
        }
    }
}
