//! Tool catalog - declarative tool definitions.
//!
//! A catalog file lists tools the way they are registered: the
//! [`ToolSpec`](crate::domain::registry::ToolSpec) fields, the adapter
//! binding (`http` template or `builtin` tool) and the phrase templates the
//! pattern parser uses to recognise them.

mod entry;
mod error;
mod factory;
mod loader;

pub use entry::{Backend, BuiltinTool, CatalogEntry};
pub use error::CatalogError;
pub use factory::{AdapterFactory, RAPIDAPI_KEY};
pub use loader::{install_entry, ToolCatalog};
