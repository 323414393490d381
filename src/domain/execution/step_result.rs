//! Step results - the recorded outcome of one planned step.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{InvocationId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Failure,
    Skipped,
}

/// Why a step failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepErrorKind {
    /// The adapter did not answer within the step timeout.
    AdapterTimeout { timeout_ms: u64 },
    /// The adapter reported an error.
    AdapterFailure { message: String },
    /// A dependency succeeded but its payload lacked a referenced field.
    MissingOutput { dependency: InvocationId, field: String },
}

impl std::fmt::Display for StepErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AdapterTimeout { timeout_ms } => write!(f, "timed out after {}ms", timeout_ms),
            Self::AdapterFailure { message } => write!(f, "{}", message),
            Self::MissingOutput { dependency, field } => {
                write!(f, "{} returned no '{}'", dependency, field)
            }
        }
    }
}

/// Why a step was never invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// A dependency failed or was itself skipped.
    DependencyFailed { dependency: InvocationId },
    /// The query was cancelled before the step started.
    Cancelled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DependencyFailed { dependency } => write!(f, "{} did not succeed", dependency),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Success { payload: Value },
    Failure { error: StepErrorKind },
    Skipped { reason: SkipReason },
}

/// The outcome of one step, stamped with when it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    invocation: InvocationId,
    tool: String,
    #[serde(flatten)]
    outcome: StepOutcome,
    recorded_at: Timestamp,
    duration_ms: u64,
}

impl StepResult {
    pub fn success(invocation: InvocationId, tool: impl Into<String>, payload: Value) -> Self {
        Self::new(invocation, tool, StepOutcome::Success { payload })
    }

    pub fn failure(invocation: InvocationId, tool: impl Into<String>, error: StepErrorKind) -> Self {
        Self::new(invocation, tool, StepOutcome::Failure { error })
    }

    pub fn skipped(invocation: InvocationId, tool: impl Into<String>, reason: SkipReason) -> Self {
        Self::new(invocation, tool, StepOutcome::Skipped { reason })
    }

    fn new(invocation: InvocationId, tool: impl Into<String>, outcome: StepOutcome) -> Self {
        Self {
            invocation,
            tool: tool.into(),
            outcome,
            recorded_at: Timestamp::now(),
            duration_ms: 0,
        }
    }

    /// Records how long the step ran, measured from `started`.
    pub fn timed_from(mut self, started: Timestamp) -> Self {
        self.duration_ms = self.recorded_at.millis_since(&started);
        self
    }

    pub fn invocation(&self) -> InvocationId {
        self.invocation
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn outcome(&self) -> &StepOutcome {
        &self.outcome
    }

    pub fn status(&self) -> StepStatus {
        match self.outcome {
            StepOutcome::Success { .. } => StepStatus::Success,
            StepOutcome::Failure { .. } => StepStatus::Failure,
            StepOutcome::Skipped { .. } => StepStatus::Skipped,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == StepStatus::Success
    }

    pub fn payload(&self) -> Option<&Value> {
        match &self.outcome {
            StepOutcome::Success { payload } => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&StepErrorKind> {
        match &self.outcome {
            StepOutcome::Failure { error } => Some(error),
            _ => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.outcome {
            StepOutcome::Skipped { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Everything except timing, for comparing runs.
    pub fn without_timing(&self) -> (InvocationId, &str, &StepOutcome) {
        (self.invocation, &self.tool, &self.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_follows_outcome() {
        let id = InvocationId::new(0);
        assert_eq!(StepResult::success(id, "w", json!({})).status(), StepStatus::Success);
        assert_eq!(
            StepResult::failure(id, "w", StepErrorKind::AdapterTimeout { timeout_ms: 5 }).status(),
            StepStatus::Failure
        );
        assert_eq!(
            StepResult::skipped(id, "w", SkipReason::Cancelled).status(),
            StepStatus::Skipped
        );
    }

    #[test]
    fn accessors_expose_only_matching_detail() {
        let result = StepResult::success(InvocationId::new(1), "weather", json!({"temp": 30}));
        assert_eq!(result.payload(), Some(&json!({"temp": 30})));
        assert!(result.error().is_none());
        assert!(result.skip_reason().is_none());
    }

    #[test]
    fn serializes_flat_with_status_tag() {
        let result = StepResult::skipped(
            InvocationId::new(2),
            "news",
            SkipReason::DependencyFailed {
                dependency: InvocationId::new(0),
            },
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["invocation"], 2);
        assert_eq!(json["reason"], json!({"kind": "dependency_failed", "dependency": 0}));
        assert!(json.get("recorded_at").is_some());
    }

    #[test]
    fn error_kinds_describe_themselves() {
        assert_eq!(
            StepErrorKind::MissingOutput {
                dependency: InvocationId::new(0),
                field: "to".into()
            }
            .to_string(),
            "step-0 returned no 'to'"
        );
        assert_eq!(
            SkipReason::DependencyFailed {
                dependency: InvocationId::new(3)
            }
            .to_string(),
            "step-3 did not succeed"
        );
    }
}
