//! Service wiring.
//!
//! Turns an [`AppConfig`] into the shared registry, pattern book and
//! [`QueryEngine`] the HTTP layer serves from.

use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::info;

use crate::adapters::ai::{AiInvocationProposer, OpenAIConfig, OpenAIProvider};
use crate::adapters::catalog::{AdapterFactory, CatalogError, ToolCatalog};
use crate::application::handlers::query::QueryEngine;
use crate::config::{AppConfig, ValidationError};
use crate::domain::execution::Executor;
use crate::domain::intent::{
    FallbackIntentParser, GenerativeIntentParser, IntentParser, ParserStrategy,
    PatternIntentParser, SharedPatternBook,
};
use crate::domain::registry::SharedToolRegistry;
use crate::ports::{AIError, InvocationProposer};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("Tool catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Generative backend error: {0}")]
    Ai(#[from] AIError),

    #[error("Parser strategy '{0}' needs a generative backend")]
    MissingProposer(ParserStrategy),
}

/// Everything a running server shares between requests.
#[derive(Clone)]
pub struct Services {
    pub registry: Arc<SharedToolRegistry>,
    pub book: SharedPatternBook,
    pub factory: Arc<AdapterFactory>,
    pub query_engine: Arc<QueryEngine>,
}

impl Services {
    /// Builds services from configuration, including the OpenAI proposer
    /// when the parser strategy needs one.
    pub fn from_config(config: &AppConfig) -> Result<Self, BootstrapError> {
        let factory = AdapterFactory::from_config(&config.adapters)?;

        let proposer = if config.parser.needs_generative() {
            Some(openai_proposer(config)?)
        } else {
            None
        };

        Self::assemble(config, factory, proposer)
    }

    /// Builds services with an explicit adapter factory and proposer.
    ///
    /// Installs the built-in catalog, then the configured catalog file if
    /// any.
    pub fn assemble(
        config: &AppConfig,
        factory: AdapterFactory,
        proposer: Option<Arc<dyn InvocationProposer>>,
    ) -> Result<Self, BootstrapError> {
        let registry = Arc::new(SharedToolRegistry::new());
        let book = SharedPatternBook::default();

        ToolCatalog::builtin()?.install(&registry, &book, &factory)?;
        if let Some(path) = &config.adapters.catalog_path {
            let catalog = ToolCatalog::from_path(path)?;
            let count = catalog.install(&registry, &book, &factory)?;
            info!(path = %path.display(), count, "Extra tool catalog installed");
        }

        let parser = build_parser(
            config.parser.strategy,
            config.parser.priority_list(),
            book.clone(),
            proposer,
        )?;

        let executor = Executor::new(config.engine.executor_config());
        let query_engine = Arc::new(QueryEngine::new(registry.clone(), parser, executor));

        info!(
            tools = registry.snapshot().len(),
            strategy = %config.parser.strategy,
            "Services ready"
        );

        Ok(Self {
            registry,
            book,
            factory: Arc::new(factory),
            query_engine,
        })
    }
}

/// Selects the intent parser for `strategy`.
pub fn build_parser(
    strategy: ParserStrategy,
    priority: Vec<String>,
    book: SharedPatternBook,
    proposer: Option<Arc<dyn InvocationProposer>>,
) -> Result<Arc<dyn IntentParser>, BootstrapError> {
    let pattern = || Arc::new(PatternIntentParser::new(book.clone()).with_priority(priority.clone()));
    let generative = |proposer: Option<Arc<dyn InvocationProposer>>| {
        proposer
            .map(|p| Arc::new(GenerativeIntentParser::new(p)))
            .ok_or(BootstrapError::MissingProposer(strategy))
    };

    let parser: Arc<dyn IntentParser> = match strategy {
        ParserStrategy::Pattern => pattern(),
        ParserStrategy::Generative => generative(proposer)?,
        ParserStrategy::Hybrid => Arc::new(FallbackIntentParser::new(
            pattern(),
            generative(proposer)?,
        )),
    };
    Ok(parser)
}

fn openai_proposer(config: &AppConfig) -> Result<Arc<dyn InvocationProposer>, BootstrapError> {
    let api_key = config
        .ai
        .api_key
        .as_ref()
        .map(|k| k.expose_secret().clone())
        .ok_or(ValidationError::MissingRequired("AI__API_KEY"))?;

    let provider = OpenAIProvider::new(
        OpenAIConfig::new(api_key)
            .with_model(config.ai.model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?;

    Ok(Arc::new(AiInvocationProposer::new(Arc::new(provider))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::application::handlers::query::HandleQueryCommand;
    use crate::domain::execution::AggregateStatus;
    use reqwest::Client;
    use std::time::Duration;

    fn factory() -> AdapterFactory {
        AdapterFactory::new(Client::new(), Duration::from_secs(1))
    }

    #[test]
    fn pattern_setup_registers_builtin_tools() {
        let services = Services::assemble(&AppConfig::default(), factory(), None).unwrap();

        assert_eq!(
            services.registry.snapshot().names(),
            vec!["weather", "news", "currency", "movie", "recipe", "calculator"]
        );
        assert!(services.book.read(|b| b.has_templates("currency")));
    }

    #[test]
    fn generative_strategy_without_proposer_fails() {
        let result = build_parser(
            ParserStrategy::Hybrid,
            Vec::new(),
            SharedPatternBook::default(),
            None,
        );
        assert!(matches!(
            result,
            Err(BootstrapError::MissingProposer(ParserStrategy::Hybrid))
        ));
    }

    #[test]
    fn parser_reports_selected_strategy() {
        let proposer: Arc<dyn InvocationProposer> =
            Arc::new(AiInvocationProposer::new(Arc::new(MockAIProvider::new())));

        for strategy in [
            ParserStrategy::Pattern,
            ParserStrategy::Generative,
            ParserStrategy::Hybrid,
        ] {
            let parser = build_parser(
                strategy,
                Vec::new(),
                SharedPatternBook::default(),
                Some(proposer.clone()),
            )
            .unwrap();
            assert_eq!(parser.strategy(), strategy);
        }
    }

    #[test]
    fn missing_catalog_file_fails_startup() {
        let mut config = AppConfig::default();
        config.adapters.catalog_path = Some("/nonexistent/tools.yaml".into());

        assert!(matches!(
            Services::assemble(&config, factory(), None),
            Err(BootstrapError::Catalog(CatalogError::Io { .. }))
        ));
    }

    #[tokio::test]
    async fn calculator_query_runs_end_to_end() {
        let services = Services::assemble(&AppConfig::default(), factory(), None).unwrap();

        let result = services
            .query_engine
            .handle(HandleQueryCommand::new("what is 12 times 7"))
            .await
            .unwrap();

        assert_eq!(result.response.status, AggregateStatus::AllSucceeded);
        assert_eq!(result.response.steps.len(), 1);
    }
}
