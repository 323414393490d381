//! Error types for execution planning

use crate::domain::foundation::InvocationId;

/// Planning errors. Any of these aborts the whole query before execution.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Duplicate invocation id: {0}")]
    DuplicateInvocation(InvocationId),

    #[error("Unresolved reference from {step} to {target}.{field}: {reason}")]
    UnresolvedReference {
        step: InvocationId,
        target: InvocationId,
        field: String,
        reason: String,
    },

    #[error("Cyclic dependency among {}", format_steps(.steps))]
    CyclicDependency { steps: Vec<InvocationId> },
}

fn format_steps(steps: &[InvocationId]) -> String {
    steps
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
