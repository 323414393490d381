//! Copy-on-write handle over the tool registry.
//!
//! Queries take an immutable snapshot at the start and keep it for their
//! whole lifetime, so a tool registered mid-query is only visible to later
//! queries. Writers clone the current registry, mutate the clone, and swap
//! it in.

use std::sync::{Arc, RwLock};

use super::{RegistryError, ToolRegistry, ToolSpec};
use crate::ports::ToolAdapter;

#[derive(Debug, Default)]
pub struct SharedToolRegistry {
    current: RwLock<Arc<ToolRegistry>>,
}

impl SharedToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current registry version.
    pub fn snapshot(&self) -> Arc<ToolRegistry> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    pub fn register(
        &self,
        spec: ToolSpec,
        adapter: Arc<dyn ToolAdapter>,
    ) -> Result<(), RegistryError> {
        self.update(|registry| registry.register(spec, adapter))
    }

    pub fn unregister(&self, name: &str) -> Result<Arc<ToolSpec>, RegistryError> {
        self.update(|registry| registry.unregister(name))
    }

    /// Applies a mutation to a private copy and publishes it on success.
    fn update<T>(
        &self,
        mutate: impl FnOnce(&mut ToolRegistry) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let mut next = ToolRegistry::clone(&**guard);
        let out = mutate(&mut next)?;
        *guard = Arc::new(next);
        Ok(out)
    }
}
