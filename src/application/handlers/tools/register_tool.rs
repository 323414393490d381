//! RegisterToolHandler - Command handler for adding a tool at runtime.

use std::sync::Arc;

use crate::adapters::catalog::{install_entry, AdapterFactory, CatalogEntry, CatalogError};
use crate::domain::intent::SharedPatternBook;
use crate::domain::registry::{SharedToolRegistry, ToolSpec};

/// Command to register one catalog entry.
#[derive(Debug, Clone)]
pub struct RegisterToolCommand {
    pub entry: CatalogEntry,
}

/// Result of successful registration.
#[derive(Debug, Clone)]
pub struct RegisterToolResult {
    pub spec: ToolSpec,
    pub patterns: usize,
}

/// Handler for registering tools.
///
/// Queries already in flight keep the registry version they started with.
pub struct RegisterToolHandler {
    registry: Arc<SharedToolRegistry>,
    book: SharedPatternBook,
    factory: Arc<AdapterFactory>,
}

impl RegisterToolHandler {
    pub fn new(
        registry: Arc<SharedToolRegistry>,
        book: SharedPatternBook,
        factory: Arc<AdapterFactory>,
    ) -> Self {
        Self {
            registry,
            book,
            factory,
        }
    }

    pub fn handle(&self, cmd: RegisterToolCommand) -> Result<RegisterToolResult, CatalogError> {
        let spec = cmd.entry.spec.clone();
        let patterns = cmd.entry.patterns.len();

        install_entry(cmd.entry, &self.registry, &self.book, &self.factory)?;

        Ok(RegisterToolResult { spec, patterns })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::BuiltinTool;
    use crate::domain::registry::RegistryError;
    use reqwest::Client;
    use std::time::Duration;

    fn handler() -> (RegisterToolHandler, Arc<SharedToolRegistry>, SharedPatternBook) {
        let registry = Arc::new(SharedToolRegistry::new());
        let book = SharedPatternBook::default();
        let factory = Arc::new(AdapterFactory::new(Client::new(), Duration::from_secs(1)));
        (
            RegisterToolHandler::new(registry.clone(), book.clone(), factory),
            registry,
            book,
        )
    }

    fn calculator_entry(name: &str) -> CatalogEntry {
        CatalogEntry {
            spec: ToolSpec::new(name, "math"),
            http: None,
            builtin: Some(BuiltinTool::Calculator),
            patterns: vec![r"(?P<num1>\d+) plus (?P<num2>\d+)".to_string()],
        }
    }

    #[test]
    fn registers_spec_and_patterns() {
        let (handler, registry, book) = handler();

        let result = handler
            .handle(RegisterToolCommand {
                entry: calculator_entry("calc"),
            })
            .unwrap();

        assert_eq!(result.spec.name(), "calc");
        assert_eq!(result.patterns, 1);
        assert!(registry.snapshot().contains("calc"));
        assert!(book.read(|b| b.has_templates("calc")));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let (handler, registry, _) = handler();
        handler
            .handle(RegisterToolCommand {
                entry: calculator_entry("calc"),
            })
            .unwrap();

        let err = handler
            .handle(RegisterToolCommand {
                entry: calculator_entry("calc"),
            })
            .unwrap_err();

        assert!(matches!(
            err,
            CatalogError::Registry(RegistryError::DuplicateTool(_))
        ));
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn entry_without_backend_is_rejected() {
        let (handler, registry, _) = handler();
        let mut entry = calculator_entry("calc");
        entry.builtin = None;

        assert!(handler.handle(RegisterToolCommand { entry }).is_err());
        assert!(registry.snapshot().is_empty());
    }
}
