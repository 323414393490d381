//! Domain layer containing the orchestration logic and its types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps)
//! - `registry` - Tool specs and the registry binding them to adapters
//! - `intent` - Query segmentation and parsing into invocations
//! - `planning` - Dependency graph construction and ordering
//! - `execution` - Concurrent plan execution and result aggregation

pub mod execution;
pub mod foundation;
pub mod intent;
pub mod planning;
pub mod registry;
