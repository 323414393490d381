//! Tool registration command and query handlers.

mod list_tools;
mod register_tool;
mod unregister_tool;

pub use list_tools::{ListToolsHandler, ListToolsQuery};
pub use register_tool::{RegisterToolCommand, RegisterToolHandler, RegisterToolResult};
pub use unregister_tool::{UnregisterToolCommand, UnregisterToolHandler, UnregisterToolResult};
