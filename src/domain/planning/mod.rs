//! Execution planning domain.
//!
//! Turns a set of invocations into an [`ExecutionPlan`]: a topological
//! order of steps with their dependency sets and concurrency waves.

mod errors;
mod plan;
mod planner;

pub use errors::PlanError;
pub use plan::{ExecutionPlan, PlannedStep};
pub use planner::Planner;
