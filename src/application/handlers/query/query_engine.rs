//! QueryEngine - the text-in, aggregate-out entry point.
//!
//! One call runs the whole pipeline against a registry snapshot:
//! parse, plan, execute, aggregate. Registration calls made while a query is
//! in flight only affect later queries.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use crate::domain::execution::{AggregateResponse, Executor, ResultAggregator};
use crate::domain::foundation::QueryId;
use crate::domain::intent::{IntentParser, ParserError, RejectedIntent};
use crate::domain::planning::{PlanError, Planner};
use crate::domain::registry::{SharedToolRegistry, ToolSpec};

/// Command to answer one natural-language query.
#[derive(Debug, Clone)]
pub struct HandleQueryCommand {
    pub text: String,
}

impl HandleQueryCommand {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Result of a handled query.
#[derive(Debug, Clone)]
pub struct HandleQueryResult {
    pub query_id: QueryId,
    pub response: AggregateResponse,
}

/// Errors that abort a whole query.
///
/// Step-level failures never appear here; they are part of the
/// [`AggregateResponse`].
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Query text is empty")]
    EmptyQuery,

    #[error("No tool matched the query")]
    NoToolMatched {
        rejected: Vec<RejectedIntent>,
        unmatched: Vec<String>,
    },

    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    Planning(#[from] PlanError),
}

pub struct QueryEngine {
    registry: Arc<SharedToolRegistry>,
    parser: Arc<dyn IntentParser>,
    executor: Executor,
}

impl QueryEngine {
    pub fn new(
        registry: Arc<SharedToolRegistry>,
        parser: Arc<dyn IntentParser>,
        executor: Executor,
    ) -> Self {
        Self {
            registry,
            parser,
            executor,
        }
    }

    pub fn registry(&self) -> &Arc<SharedToolRegistry> {
        &self.registry
    }

    pub async fn handle(&self, cmd: HandleQueryCommand) -> Result<HandleQueryResult, QueryError> {
        self.handle_with_cancel(cmd, CancellationToken::new()).await
    }

    /// Like [`handle`](Self::handle), but stops starting new steps once
    /// `cancel` fires. Results recorded so far are returned.
    pub async fn handle_with_cancel(
        &self,
        cmd: HandleQueryCommand,
        cancel: CancellationToken,
    ) -> Result<HandleQueryResult, QueryError> {
        let text = cmd.text.trim();
        if text.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let query_id = QueryId::new();
        let span = info_span!(
            "query",
            query_id = %query_id,
            strategy = %self.parser.strategy()
        );

        self.run(text, query_id, cancel).instrument(span).await
    }

    async fn run(
        &self,
        text: &str,
        query_id: QueryId,
        cancel: CancellationToken,
    ) -> Result<HandleQueryResult, QueryError> {
        let registry = self.registry.snapshot();

        let outcome = self.parser.parse(text, &registry).await?;
        debug!(
            invocations = outcome.invocations.len(),
            rejected = outcome.rejected.len(),
            unmatched = outcome.unmatched.len(),
            "Query parsed"
        );

        if outcome.invocations.is_empty() {
            info!("No tool matched");
            return Err(QueryError::NoToolMatched {
                rejected: outcome.rejected,
                unmatched: outcome.unmatched,
            });
        }

        let plan = Planner::plan(outcome.invocations, &registry)?;
        let report = self
            .executor
            .execute_with_cancel(&plan, &registry, cancel)
            .await;

        let mut response = ResultAggregator::aggregate(report.results, |tool| {
            registry.lookup(tool).ok().and_then(ToolSpec::summary)
        });
        response.rejected = outcome.rejected;
        response.cancelled = report.cancelled;

        info!(
            status = ?response.status,
            steps = response.steps.len(),
            cancelled = response.cancelled,
            "Query answered"
        );

        Ok(HandleQueryResult { query_id, response })
    }
}
