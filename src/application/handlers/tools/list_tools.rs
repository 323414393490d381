//! ListToolsHandler - Query handler for the registry listing.

use std::sync::Arc;

use crate::domain::registry::{SharedToolRegistry, ToolSpec};

/// Query for all registered tools.
#[derive(Debug, Clone, Default)]
pub struct ListToolsQuery;

pub struct ListToolsHandler {
    registry: Arc<SharedToolRegistry>,
}

impl ListToolsHandler {
    pub fn new(registry: Arc<SharedToolRegistry>) -> Self {
        Self { registry }
    }

    /// Returns every spec in registration order.
    pub fn handle(&self, _query: ListToolsQuery) -> Vec<ToolSpec> {
        self.registry.snapshot().list_all().cloned().collect()
    }
}
