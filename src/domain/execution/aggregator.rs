//! Result aggregation - folds step results into one response.
//!
//! The summary gives one paragraph per step. A successful step reads
//! through its tool's [`SummaryTemplate`] when one is declared and renders,
//! otherwise as its scalar payload fields.

use serde::Serialize;
use serde_json::Value;

use super::{StepOutcome, StepResult, StepStatus};
use crate::domain::foundation::InvocationId;
use crate::domain::intent::RejectedIntent;
use crate::domain::registry::SummaryTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    AllSucceeded,
    Partial,
    AllFailed,
}

/// A successful step's payload labelled with its tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedPayload {
    pub step: InvocationId,
    pub tool: String,
    pub payload: Value,
}

/// Combined payload: unwrapped for single-tool plans, tagged otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CombinedPayload {
    Single(Value),
    Tagged(Vec<TaggedPayload>),
}

/// The answer to one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResponse {
    pub status: AggregateStatus,
    pub steps: Vec<StepResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<CombinedPayload>,
    pub summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedIntent>,
    pub cancelled: bool,
}

impl AggregateResponse {
    /// Comparable view without timestamps, for determinism checks.
    pub fn outcomes(&self) -> Vec<(usize, &str, &StepOutcome)> {
        self.steps
            .iter()
            .map(|s| {
                let (id, tool, outcome) = s.without_timing();
                (id.index(), tool, outcome)
            })
            .collect()
    }

    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status() == status).count()
    }
}

pub struct ResultAggregator;

impl ResultAggregator {
    /// Folds step results (in plan order) into a response.
    ///
    /// `template_for` returns the summary template of a tool, if any.
    /// An empty result list counts as all failed.
    pub fn aggregate<'t, F>(results: Vec<StepResult>, template_for: F) -> AggregateResponse
    where
        F: Fn(&str) -> Option<&'t SummaryTemplate>,
    {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let status = if results.is_empty() || succeeded == 0 {
            AggregateStatus::AllFailed
        } else if succeeded == results.len() {
            AggregateStatus::AllSucceeded
        } else {
            AggregateStatus::Partial
        };

        let payload = match results.as_slice() {
            [] => None,
            [only] => only.payload().cloned().map(CombinedPayload::Single),
            many => {
                let tagged: Vec<TaggedPayload> = many
                    .iter()
                    .filter_map(|r| {
                        r.payload().map(|p| TaggedPayload {
                            step: r.invocation(),
                            tool: r.tool().to_string(),
                            payload: p.clone(),
                        })
                    })
                    .collect();
                (!tagged.is_empty()).then_some(CombinedPayload::Tagged(tagged))
            }
        };

        AggregateResponse {
            status,
            summary: summarize(&results, template_for),
            steps: results,
            payload,
            rejected: Vec::new(),
            cancelled: false,
        }
    }
}

fn summarize<'t, F>(results: &[StepResult], template_for: F) -> String
where
    F: Fn(&str) -> Option<&'t SummaryTemplate>,
{
    if results.is_empty() {
        return "No tools were run.".to_string();
    }
    results
        .iter()
        .map(|r| match r.outcome() {
            StepOutcome::Success { payload } => template_for(r.tool())
                .and_then(|template| template.render(payload))
                .unwrap_or_else(|| describe(r.tool(), payload)),
            StepOutcome::Failure { error } => format!("{}: failed ({})", r.tool(), error),
            StepOutcome::Skipped { reason } => format!("{}: skipped ({})", r.tool(), reason),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Generic text for a payload: its scalar fields, and the length of its lists.
fn describe(tool: &str, payload: &Value) -> String {
    let fields: Vec<String> = match payload {
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, value)| match value {
                Value::Null | Value::Object(_) => None,
                Value::Array(items) => Some(format!("{}: {} item(s)", key, items.len())),
                Value::String(s) => Some(format!("{}: {}", key, s)),
                other => Some(format!("{}: {}", key, other)),
            })
            .collect(),
        Value::Null => Vec::new(),
        Value::String(s) => vec![s.clone()],
        other => vec![other.to_string()],
    };

    if fields.is_empty() {
        format!("{}: done", tool)
    } else {
        format!("{}: {}", tool, fields.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::{SkipReason, StepErrorKind};
    use serde_json::json;
    use std::collections::HashMap;

    fn untemplated(results: Vec<StepResult>) -> AggregateResponse {
        ResultAggregator::aggregate(results, |_| None)
    }

    fn ok(id: usize, tool: &str, payload: Value) -> StepResult {
        StepResult::success(InvocationId::new(id), tool, payload)
    }

    fn failed(id: usize, tool: &str) -> StepResult {
        StepResult::failure(
            InvocationId::new(id),
            tool,
            StepErrorKind::AdapterFailure {
                message: "boom".into(),
            },
        )
    }

    fn skipped(id: usize, tool: &str, dep: usize) -> StepResult {
        StepResult::skipped(
            InvocationId::new(id),
            tool,
            SkipReason::DependencyFailed {
                dependency: InvocationId::new(dep),
            },
        )
    }

    #[test]
    fn single_success_returns_unwrapped_payload() {
        let response = untemplated(vec![ok(0, "weather", json!({"temp": 31}))]);

        assert_eq!(response.status, AggregateStatus::AllSucceeded);
        assert_eq!(response.payload, Some(CombinedPayload::Single(json!({"temp": 31}))));
        assert_eq!(response.summary, "weather: temp: 31");
    }

    #[test]
    fn multi_tool_payloads_are_tagged_in_plan_order() {
        let response = untemplated(vec![
            ok(0, "weather", json!({"temp": 31})),
            ok(1, "news", json!({"articles": []})),
        ]);

        assert_eq!(
            serde_json::to_value(&response.payload).unwrap(),
            json!([
                {"step": 0, "tool": "weather", "payload": {"temp": 31}},
                {"step": 1, "tool": "news", "payload": {"articles": []}}
            ])
        );
    }

    #[test]
    fn mixed_outcomes_are_partial() {
        let response = untemplated(vec![
            ok(0, "weather", json!({})),
            failed(1, "news"),
        ]);
        assert_eq!(response.status, AggregateStatus::Partial);
        assert_eq!(response.summary, "weather: done\n\nnews: failed (boom)");
        assert_eq!(response.count(StepStatus::Failure), 1);
    }

    #[test]
    fn failures_and_skips_only_are_all_failed() {
        let response = untemplated(vec![
            failed(0, "currency"),
            skipped(1, "currency", 0),
        ]);
        assert_eq!(response.status, AggregateStatus::AllFailed);
        assert!(response.payload.is_none());
        assert_eq!(
            response.summary,
            "currency: failed (boom)\n\ncurrency: skipped (step-0 did not succeed)"
        );
    }

    #[test]
    fn empty_results_are_all_failed() {
        let response = untemplated(Vec::new());
        assert_eq!(response.status, AggregateStatus::AllFailed);
        assert!(response.payload.is_none());
    }

    #[test]
    fn steps_are_kept_in_given_order() {
        let response = untemplated(vec![
            failed(0, "a"),
            ok(1, "b", json!(1)),
            skipped(2, "c", 0),
        ]);
        let ids: Vec<usize> = response.outcomes().iter().map(|(id, _, _)| *id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn templates_narrate_successful_steps() {
        let templates: HashMap<&str, SummaryTemplate> = [
            ("currency", "{amount} {from} = {converted_amount:.2} {to}"),
            ("news", "Latest news:\n{articles[].title}"),
        ]
        .into_iter()
        .map(|(tool, source)| (tool, SummaryTemplate::parse(source).unwrap()))
        .collect();

        let response = ResultAggregator::aggregate(
            vec![
                ok(
                    0,
                    "currency",
                    json!({"amount": 100, "from": "USD", "to": "EUR", "converted_amount": 92.5}),
                ),
                ok(1, "news", json!({"articles": [{"title": "One"}, {"title": "Two"}]})),
                failed(2, "weather"),
            ],
            |tool| templates.get(tool),
        );

        assert_eq!(
            response.summary,
            "100 USD = 92.50 EUR\n\nLatest news:\n- One\n- Two\n\nweather: failed (boom)"
        );
    }

    #[test]
    fn unrenderable_template_falls_back_to_fields() {
        let template = SummaryTemplate::parse("Latest news:\n{articles[].title}").unwrap();

        let response = ResultAggregator::aggregate(
            vec![ok(0, "news", json!({"articles": []}))],
            |_| Some(&template),
        );

        assert_eq!(response.summary, "news: articles: 0 item(s)");
    }
}
