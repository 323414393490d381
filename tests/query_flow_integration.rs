//! Integration tests for the query pipeline.
//!
//! These tests run real queries through the built-in catalog's phrase
//! templates, with mock adapters standing in for the HTTP tools:
//! 1. Compound queries split into ordered, dependent steps
//! 2. Independent steps run concurrently
//! 3. Failures, timeouts and skips are reported per step

use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tool_orchestrator::adapters::catalog::{BuiltinTool, ToolCatalog};
use tool_orchestrator::adapters::tools::{CalculatorAdapter, MockToolAdapter};
use tool_orchestrator::application::{HandleQueryCommand, QueryEngine, QueryError};
use tool_orchestrator::domain::execution::{
    AggregateStatus, CombinedPayload, Executor, ExecutorConfig, StepErrorKind, StepStatus,
};
use tool_orchestrator::domain::intent::{PatternIntentParser, SharedPatternBook};
use tool_orchestrator::domain::planning::PlanError;
use tool_orchestrator::domain::registry::SharedToolRegistry;
use tool_orchestrator::ports::{AdapterError, ToolAdapter};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Mocks for the HTTP tools of the built-in catalog.
#[derive(Clone)]
struct Tools {
    weather: MockToolAdapter,
    news: MockToolAdapter,
    currency: MockToolAdapter,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            weather: MockToolAdapter::always(json!({
                "city": "Hanoi",
                "temperature": 31,
                "description": "clear sky",
                "humidity": 70
            })),
            news: MockToolAdapter::always(json!({"articles": [{"title": "headline"}]})),
            currency: MockToolAdapter::always(json!({
                "from": "USD",
                "to": "EUR",
                "amount": 100,
                "converted_amount": 92.5,
                "rate": 0.925
            })),
        }
    }
}

fn engine_with(tools: &Tools, step_timeout: Duration) -> QueryEngine {
    let registry = Arc::new(SharedToolRegistry::new());
    let book = SharedPatternBook::default();

    for entry in ToolCatalog::builtin().unwrap().entries() {
        let adapter: Arc<dyn ToolAdapter> = match (entry.name(), entry.builtin) {
            (_, Some(BuiltinTool::Calculator)) => Arc::new(CalculatorAdapter::new()),
            ("weather", _) => Arc::new(tools.weather.clone()),
            ("news", _) => Arc::new(tools.news.clone()),
            ("currency", _) => Arc::new(tools.currency.clone()),
            _ => Arc::new(MockToolAdapter::new()),
        };
        registry.register(entry.spec.clone(), adapter).unwrap();
        book.add(entry.name(), &entry.patterns).unwrap();
    }

    QueryEngine::new(
        registry,
        Arc::new(PatternIntentParser::new(book)),
        Executor::new(ExecutorConfig {
            step_timeout,
            max_concurrency: 4,
        }),
    )
}

fn engine(tools: &Tools) -> QueryEngine {
    engine_with(tools, Duration::from_secs(2))
}

// =============================================================================
// Compound queries
// =============================================================================

#[tokio::test]
async fn weather_then_news_about_it_uses_weather_city() {
    let tools = Tools::default();
    let result = engine(&tools)
        .handle(HandleQueryCommand::new(
            "What's the weather in Hanoi and then find news about it?",
        ))
        .await
        .unwrap();

    assert_eq!(result.response.status, AggregateStatus::AllSucceeded);
    assert_eq!(result.response.steps.len(), 2);
    assert_eq!(result.response.steps[0].tool(), "weather");
    assert_eq!(result.response.steps[1].tool(), "news");

    assert_eq!(
        result.response.summary,
        "Hanoi: 31°C, clear sky, humidity 70%\n\nLatest news:\n- headline"
    );

    let news_calls = tools.news.calls();
    assert_eq!(news_calls.len(), 1);
    assert_eq!(news_calls[0].str_param("query"), Some("Hanoi"));
    assert_eq!(tools.weather.calls()[0].str_param("city"), Some("Hanoi"));
}

#[tokio::test]
async fn calculator_chain_feeds_result_forward() {
    let result = engine(&Tools::default())
        .handle(HandleQueryCommand::new(
            "what is 12 times 7 and then add 6 to it",
        ))
        .await
        .unwrap();

    assert_eq!(result.response.status, AggregateStatus::AllSucceeded);
    match result.response.payload {
        Some(CombinedPayload::Tagged(tagged)) => {
            assert_eq!(tagged.len(), 2);
            assert_eq!(tagged[0].payload["result"], json!(84));
            assert_eq!(tagged[1].payload["result"], json!(90));
        }
        other => panic!("expected tagged payload, got {:?}", other),
    }
}

#[tokio::test]
async fn single_tool_payload_is_unwrapped() {
    let tools = Tools::default();
    let result = engine(&tools)
        .handle(HandleQueryCommand::new("Convert 100 USD to EUR"))
        .await
        .unwrap();

    let calls = tools.currency.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].str_param("from"), Some("USD"));
    assert_eq!(calls[0].str_param("to"), Some("EUR"));
    assert_eq!(calls[0].number_param("amount"), Some(100.0));
    assert_eq!(calls[0].parameters.len(), 3);

    assert_eq!(result.response.summary, "100 USD = 92.50 EUR");
    match result.response.payload {
        Some(CombinedPayload::Single(payload)) => {
            assert_eq!(payload["converted_amount"], json!(92.5));
        }
        other => panic!("expected single payload, got {:?}", other),
    }
}

#[tokio::test]
async fn pronoun_chains_conversion_without_then() {
    for query in [
        "Convert 100 USD to EUR; convert it to JPY",
        "Convert 100 USD to EUR and convert it to JPY",
    ] {
        let tools = Tools::default();
        let result = engine(&tools)
            .handle(HandleQueryCommand::new(query))
            .await
            .unwrap();

        assert_eq!(result.response.status, AggregateStatus::AllSucceeded, "{}", query);
        assert!(result.response.rejected.is_empty(), "{}", query);

        let calls = tools.currency.calls();
        assert_eq!(calls.len(), 2, "{}", query);
        assert_eq!(calls[1].str_param("from"), Some("EUR"));
        assert_eq!(calls[1].str_param("to"), Some("JPY"));
        assert_eq!(calls[1].number_param("amount"), Some(92.5));
    }
}

#[tokio::test]
async fn unresolvable_reference_runs_no_tool() {
    let tools = Tools::default();
    let result = engine(&tools)
        .handle(HandleQueryCommand::new(
            "convert 100 usd to eur and then find news about it",
        ))
        .await;

    assert!(matches!(
        result,
        Err(QueryError::Planning(PlanError::UnresolvedReference { .. }))
    ));
    assert_eq!(tools.currency.call_count(), 0);
    assert_eq!(tools.news.call_count(), 0);
}

#[tokio::test]
async fn independent_steps_run_concurrently() {
    let tools = Tools {
        weather: MockToolAdapter::always(json!({"city": "x", "temperature": 1}))
            .with_delay(Duration::from_millis(200)),
        news: MockToolAdapter::always(json!({"articles": []}))
            .with_delay(Duration::from_millis(200)),
        ..Tools::default()
    };

    let started = Instant::now();
    let result = engine(&tools)
        .handle(HandleQueryCommand::new(
            "weather in Paris and news about Tokyo",
        ))
        .await
        .unwrap();

    assert_eq!(result.response.status, AggregateStatus::AllSucceeded);
    assert_eq!(result.response.steps.len(), 2);
    assert!(
        started.elapsed() < Duration::from_millis(380),
        "steps ran sequentially: {:?}",
        started.elapsed()
    );
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn independent_failure_gives_partial_result() {
    let tools = Tools {
        news: MockToolAdapter::new().with_error(AdapterError::unavailable("news down")),
        ..Tools::default()
    };

    let result = engine(&tools)
        .handle(HandleQueryCommand::new(
            "weather in Oslo and news about Norway",
        ))
        .await
        .unwrap();

    assert_eq!(result.response.status, AggregateStatus::Partial);
    assert_eq!(result.response.count(StepStatus::Success), 1);
    assert_eq!(result.response.count(StepStatus::Failure), 1);
}

#[tokio::test]
async fn failed_dependency_skips_dependent_step() {
    let tools = Tools {
        weather: MockToolAdapter::new().with_error(AdapterError::unavailable("weather down")),
        ..Tools::default()
    };

    let result = engine(&tools)
        .handle(HandleQueryCommand::new(
            "weather in Hanoi and then find news about it",
        ))
        .await
        .unwrap();

    assert_eq!(result.response.status, AggregateStatus::AllFailed);
    assert_eq!(result.response.steps[1].status(), StepStatus::Skipped);
    assert_eq!(tools.news.call_count(), 0);
}

#[tokio::test]
async fn slow_adapter_times_out() {
    let tools = Tools {
        weather: MockToolAdapter::always(json!({"city": "x"}))
            .with_delay(Duration::from_millis(500)),
        ..Tools::default()
    };

    let result = engine_with(&tools, Duration::from_millis(50))
        .handle(HandleQueryCommand::new("weather in Lima"))
        .await
        .unwrap();

    assert_eq!(result.response.status, AggregateStatus::AllFailed);
    assert!(matches!(
        result.response.steps[0].error(),
        Some(StepErrorKind::AdapterTimeout { timeout_ms: 50 })
    ));
}

#[tokio::test]
async fn division_by_zero_is_a_step_failure() {
    let result = engine(&Tools::default())
        .handle(HandleQueryCommand::new("what is 10 divided by 0"))
        .await
        .unwrap();

    assert_eq!(result.response.status, AggregateStatus::AllFailed);
    assert!(matches!(
        result.response.steps[0].error(),
        Some(StepErrorKind::AdapterFailure { .. })
    ));
}

#[tokio::test]
async fn unrelated_query_matches_no_tool() {
    let result = engine(&Tools::default())
        .handle(HandleQueryCommand::new("sing me a song"))
        .await;

    assert!(matches!(result, Err(QueryError::NoToolMatched { .. })));
}

#[tokio::test]
async fn repeated_queries_are_deterministic() {
    let engine = engine(&Tools::default());
    let query = "weather in Hanoi and then find news about it";

    let first = engine.handle(HandleQueryCommand::new(query)).await.unwrap();
    let second = engine.handle(HandleQueryCommand::new(query)).await.unwrap();

    assert_eq!(first.response.outcomes(), second.response.outcomes());
    assert_ne!(first.query_id, second.query_id);
}
