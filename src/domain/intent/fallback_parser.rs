//! Hybrid parser: phrase templates first, generative backend as fallback.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{IntentParser, ParseOutcome, ParserError, ParserStrategy};
use crate::domain::registry::ToolRegistry;

/// Tries the primary parser and consults the fallback only when the primary
/// recognised nothing at all.
///
/// A failing fallback is logged and the (empty) primary outcome returned, so
/// an unreachable backend degrades to "no tool matched" rather than an error.
pub struct FallbackIntentParser {
    primary: Arc<dyn IntentParser>,
    fallback: Arc<dyn IntentParser>,
}

impl FallbackIntentParser {
    pub fn new(primary: Arc<dyn IntentParser>, fallback: Arc<dyn IntentParser>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl IntentParser for FallbackIntentParser {
    async fn parse(&self, text: &str, registry: &ToolRegistry) -> Result<ParseOutcome, ParserError> {
        let primary = self.primary.parse(text, registry).await?;
        if !primary.is_empty() {
            return Ok(primary);
        }

        info!(
            primary = %self.primary.strategy(),
            fallback = %self.fallback.strategy(),
            "Primary parser matched nothing, trying fallback"
        );
        match self.fallback.parse(text, registry).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                warn!(%error, "Fallback parser failed");
                Ok(primary)
            }
        }
    }

    fn strategy(&self) -> ParserStrategy {
        ParserStrategy::Hybrid
    }
}
