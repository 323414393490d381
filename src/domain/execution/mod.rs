//! Plan execution domain.
//!
//! Runs an [`crate::domain::planning::ExecutionPlan`] against the adapters
//! bound in the registry and folds the results into an
//! [`AggregateResponse`].

mod aggregator;
mod executor;
mod step_result;

pub use aggregator::{
    AggregateResponse, AggregateStatus, CombinedPayload, ResultAggregator, TaggedPayload,
};
pub use executor::{ExecutionReport, Executor, ExecutorConfig};
pub use step_result::{SkipReason, StepErrorKind, StepOutcome, StepResult, StepStatus};
