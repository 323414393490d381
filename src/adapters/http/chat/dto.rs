//! Data transfer objects for the chat endpoint.

use serde::{Deserialize, Serialize};

use crate::application::handlers::query::HandleQueryResult;
use crate::domain::execution::AggregateResponse;

/// Request to answer one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// The aggregate answer, tagged with the query id used in logs.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub query_id: String,
    #[serde(flatten)]
    pub response: AggregateResponse,
}

impl From<HandleQueryResult> for ChatResponse {
    fn from(result: HandleQueryResult) -> Self {
        Self {
            query_id: result.query_id.to_string(),
            response: result.response,
        }
    }
}
