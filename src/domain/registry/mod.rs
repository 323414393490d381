//! Tool registry domain.
//!
//! Holds the declared contract of every tool ([`ToolSpec`]) and binds each
//! one to the adapter that executes it.

mod errors;
mod shared;
mod summary_template;
mod tool_registry;
mod tool_spec;

pub use errors::RegistryError;
pub use shared::SharedToolRegistry;
pub use summary_template::{SummaryTemplate, SummaryTemplateError, MAX_LIST_ITEMS};
pub use tool_registry::{RegisteredTool, ToolRegistry};
pub use tool_spec::{ParameterSpec, ParameterType, ToolCategory, ToolSpec};
