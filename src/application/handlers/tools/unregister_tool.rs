//! UnregisterToolHandler - Command handler for removing a tool.

use std::sync::Arc;

use tracing::info;

use crate::domain::intent::SharedPatternBook;
use crate::domain::registry::{RegistryError, SharedToolRegistry, ToolSpec};

#[derive(Debug, Clone)]
pub struct UnregisterToolCommand {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct UnregisterToolResult {
    pub spec: Arc<ToolSpec>,
}

pub struct UnregisterToolHandler {
    registry: Arc<SharedToolRegistry>,
    book: SharedPatternBook,
}

impl UnregisterToolHandler {
    pub fn new(registry: Arc<SharedToolRegistry>, book: SharedPatternBook) -> Self {
        Self { registry, book }
    }

    pub fn handle(&self, cmd: UnregisterToolCommand) -> Result<UnregisterToolResult, RegistryError> {
        let spec = self.registry.unregister(&cmd.name)?;
        self.book.remove(&cmd.name);

        info!(tool = %cmd.name, "Tool unregistered");
        Ok(UnregisterToolResult { spec })
    }
}
