//! Pattern-based intent parser.
//!
//! Segments the query, then matches each clause against the phrase
//! templates of every registered tool in priority order. The first tool
//! whose template matches wins; other matches are logged at debug level.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use super::patterns::SharedPatternBook;
use super::segmenter::segment;
use super::slots::{is_anaphor, validate_slots, RawSlot, ReferenceContext};
use super::{
    IntentParser, Invocation, ParseOutcome, ParserError, ParserStrategy, RejectedIntent,
};
use crate::domain::foundation::InvocationId;
use crate::domain::registry::{ToolRegistry, ToolSpec};

pub struct PatternIntentParser {
    book: SharedPatternBook,
    /// Tools tried first, in this order; the rest follow in registration order.
    priority: Vec<String>,
}

impl PatternIntentParser {
    pub fn new(book: SharedPatternBook) -> Self {
        Self {
            book,
            priority: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: Vec<String>) -> Self {
        self.priority = priority;
        self
    }

    pub fn book(&self) -> &SharedPatternBook {
        &self.book
    }

    fn tool_order<'r>(&self, registry: &'r ToolRegistry) -> Vec<&'r ToolSpec> {
        let mut order: Vec<&ToolSpec> = self
            .priority
            .iter()
            .filter_map(|name| registry.lookup(name).ok())
            .collect();
        for spec in registry.list_all() {
            if !order.iter().any(|s| s.name() == spec.name()) {
                order.push(spec);
            }
        }
        order
    }

    /// Parses without suspending; the pattern path never does I/O.
    pub fn parse_text(&self, text: &str, registry: &ToolRegistry) -> ParseOutcome {
        let order = self.tool_order(registry);

        self.book.read(|book| {
            let recognises = |clause: &str| {
                order
                    .iter()
                    .any(|spec| book.capture(spec.name(), clause).is_some())
            };

            let mut outcome = ParseOutcome::default();
            let mut previous: Option<InvocationId> = None;

            for clause in segment(text, recognises) {
                let mut matches = order.iter().filter_map(|spec| {
                    book.capture(spec.name(), &clause.text)
                        .map(|slots| (*spec, slots))
                });

                let Some((spec, raw)) = matches.next() else {
                    debug!(clause = %clause.text, "No tool matched clause");
                    outcome.unmatched.push(clause.text);
                    continue;
                };

                let alternates: Vec<&str> = matches.map(|(s, _)| s.name()).collect();
                if !alternates.is_empty() {
                    debug!(
                        clause = %clause.text,
                        selected = spec.name(),
                        ?alternates,
                        "Clause matched several tools"
                    );
                }

                let id = InvocationId::new(clause.index);
                let context = ReferenceContext {
                    previous,
                    sequenced: clause.sequenced,
                };

                match validate_slots(spec, mark_anaphors(spec, raw), context) {
                    Ok(parameters) => outcome.invocations.push(Invocation::new(
                        id,
                        spec.name(),
                        parameters,
                        clause.text,
                    )),
                    Err(error) => {
                        debug!(clause = %clause.text, %error, "Rejected sub-intent");
                        outcome.rejected.push(RejectedIntent {
                            id,
                            text: clause.text,
                            error,
                        });
                    }
                }
                previous = Some(id);
            }

            outcome.prune_dangling_references();
            outcome
        })
    }
}

/// Turns pronoun captures into anaphors for parameters that can bind to an
/// earlier result. Other parameters keep the text, so "it" stays a valid
/// language code.
fn mark_anaphors(spec: &ToolSpec, raw: BTreeMap<String, RawSlot>) -> BTreeMap<String, RawSlot> {
    raw.into_iter()
        .map(|(name, slot)| {
            let binds = spec
                .parameter(&name)
                .and_then(|p| p.reference_field())
                .is_some();
            let slot = match slot {
                RawSlot::Text(text) if binds && is_anaphor(&text) => RawSlot::Anaphor,
                other => other,
            };
            (name, slot)
        })
        .collect()
}

#[async_trait]
impl IntentParser for PatternIntentParser {
    async fn parse(&self, text: &str, registry: &ToolRegistry) -> Result<ParseOutcome, ParserError> {
        Ok(self.parse_text(text, registry))
    }

    fn strategy(&self) -> ParserStrategy {
        ParserStrategy::Pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intent::{IntentError, ParamValue, PatternBook, Reference};
    use crate::domain::registry::{ParameterSpec, ParameterType};
    use crate::ports::{AdapterError, ResolvedCall, ToolAdapter};
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct NoopAdapter;

    #[async_trait]
    impl ToolAdapter for NoopAdapter {
        async fn invoke(&self, _call: &ResolvedCall) -> Result<Value, AdapterError> {
            Ok(Value::Null)
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolSpec::new("weather", "weather")
                    .with_parameter(ParameterSpec::required("city", ParameterType::String))
                    .with_outputs(["city", "temperature"]),
                Arc::new(NoopAdapter),
            )
            .unwrap();
        registry
            .register(
                ToolSpec::new("news", "news")
                    .with_parameter(
                        ParameterSpec::required("query", ParameterType::String)
                            .with_reference_field("city"),
                    )
                    .with_outputs(["articles"]),
                Arc::new(NoopAdapter),
            )
            .unwrap();
        registry
            .register(
                ToolSpec::new("currency", "currency")
                    .with_parameter(
                        ParameterSpec::required("from", ParameterType::String)
                            .with_reference_field("to"),
                    )
                    .with_parameter(ParameterSpec::required("to", ParameterType::String))
                    .with_parameter(
                        ParameterSpec::required("amount", ParameterType::Number)
                            .with_reference_field("converted_amount"),
                    )
                    .with_outputs(["from", "to", "converted_amount"]),
                Arc::new(NoopAdapter),
            )
            .unwrap();
        registry
    }

    fn parser() -> PatternIntentParser {
        let mut book = PatternBook::new();
        book.add("weather", [r"(?:what'?s )?(?:the )?weather (?:in|for) (?P<city>.+)"])
            .unwrap();
        book.add("news", [r"(?:find |get )?news about (?P<query>.+)"])
            .unwrap();
        book.add(
            "currency",
            [r"convert (?P<amount>[\d.,]+|it|that|the result)(?: (?P<from>[a-z]{3}))? (?:to|into) (?P<to>[a-z]{3})"],
        )
        .unwrap();
        PatternIntentParser::new(SharedPatternBook::new(book))
    }

    #[test]
    fn single_clause_yields_one_invocation() {
        let outcome = parser().parse_text("What's the weather in Hanoi?", &registry());

        assert_eq!(outcome.invocations.len(), 1);
        let inv = &outcome.invocations[0];
        assert_eq!(inv.tool(), "weather");
        assert_eq!(inv.parameter("city"), Some(&ParamValue::literal("Hanoi")));
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn independent_clauses_have_no_references() {
        let outcome = parser().parse_text(
            "What's the weather in Hanoi and then find news about Vietnam",
            &registry(),
        );

        let tools: Vec<&str> = outcome.invocations.iter().map(|i| i.tool()).collect();
        assert_eq!(tools, vec!["weather", "news"]);
        assert!(outcome.invocations.iter().all(Invocation::is_fully_resolved));
    }

    #[test]
    fn chained_conversion_references_previous_step() {
        let outcome = parser().parse_text(
            "Convert 100 USD to EUR and then convert it to JPY",
            &registry(),
        );

        assert_eq!(outcome.invocations.len(), 2);
        let second = &outcome.invocations[1];
        assert_eq!(
            second.parameter("amount"),
            Some(&ParamValue::Reference(Reference::new(InvocationId::new(0), "converted_amount")))
        );
        assert_eq!(
            second.parameter("from"),
            Some(&ParamValue::Reference(Reference::new(InvocationId::new(0), "to")))
        );
        assert_eq!(second.parameter("to"), Some(&ParamValue::literal("JPY")));
        assert_eq!(
            outcome.invocations[0].parameter("amount"),
            Some(&ParamValue::Literal(json!(100)))
        );
    }

    #[test]
    fn pronoun_continues_previous_step_without_sequencing_marker() {
        let registry = registry();
        for text in [
            "Convert 100 USD to EUR; convert it to JPY",
            "Convert 100 USD to EUR and convert it to JPY",
        ] {
            let outcome = parser().parse_text(text, &registry);

            assert!(outcome.rejected.is_empty(), "{}: {:?}", text, outcome.rejected);
            assert_eq!(outcome.invocations.len(), 2, "{}", text);
            let second = &outcome.invocations[1];
            assert_eq!(
                second.parameter("from"),
                Some(&ParamValue::Reference(Reference::new(InvocationId::new(0), "to")))
            );
            assert_eq!(
                second.parameter("amount"),
                Some(&ParamValue::Reference(Reference::new(InvocationId::new(0), "converted_amount")))
            );
            assert_eq!(second.parameter("to"), Some(&ParamValue::literal("JPY")));
        }
    }

    #[test]
    fn unmatched_clause_is_reported() {
        let outcome = parser().parse_text("Tell me a joke", &registry());
        assert!(outcome.invocations.is_empty());
        assert_eq!(outcome.unmatched, vec!["Tell me a joke".to_string()]);
    }

    #[test]
    fn malformed_clause_is_rejected_but_others_survive() {
        let outcome = parser().parse_text(
            "convert 1.2.3 USD to EUR; weather in Oslo",
            &registry(),
        );

        assert_eq!(outcome.invocations.len(), 1);
        assert_eq!(outcome.invocations[0].tool(), "weather");
        assert_eq!(outcome.rejected.len(), 1);
        assert!(matches!(
            outcome.rejected[0].error,
            IntentError::ParameterExtraction { .. }
        ));
    }

    #[test]
    fn reference_to_rejected_clause_is_rejected_too() {
        let outcome = parser().parse_text(
            "convert 1.2.3 USD to EUR and then convert it to JPY",
            &registry(),
        );
        assert!(outcome.invocations.is_empty());
        assert_eq!(outcome.rejected.len(), 2);
        assert_eq!(
            outcome.rejected[1].error,
            IntentError::DependsOnRejected { step: InvocationId::new(0) }
        );
    }

    #[test]
    fn priority_overrides_registration_order() {
        let registry = registry();
        let mut book = PatternBook::new();
        book.add("weather", [r"about (?P<city>.+)"]).unwrap();
        book.add("news", [r"about (?P<query>.+)"]).unwrap();
        let shared = SharedPatternBook::new(book);

        let default_order = PatternIntentParser::new(shared.clone()).parse_text("about Rome", &registry);
        assert_eq!(default_order.invocations[0].tool(), "weather");

        let prioritised = PatternIntentParser::new(shared)
            .with_priority(vec!["news".into()])
            .parse_text("about Rome", &registry);
        assert_eq!(prioritised.invocations[0].tool(), "news");
    }

    #[test]
    fn tools_without_templates_never_match() {
        let outcome = PatternIntentParser::new(SharedPatternBook::default())
            .parse_text("weather in Paris", &registry());
        assert!(outcome.invocations.is_empty());
        assert_eq!(outcome.unmatched.len(), 1);
    }

    #[test]
    fn same_text_parses_identically() {
        let parser = parser();
        let registry = registry();
        let text = "Convert 100 USD to EUR and then convert it to JPY";
        assert_eq!(parser.parse_text(text, &registry), parser.parse_text(text, &registry));
    }
}
