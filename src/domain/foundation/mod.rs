//! Foundation module - Shared domain primitives.
//!
//! Contains the identifiers and value objects used across the registry,
//! intent, planning and execution modules.

mod ids;
mod timestamp;

pub use ids::{InvocationId, QueryId};
pub use timestamp::Timestamp;
