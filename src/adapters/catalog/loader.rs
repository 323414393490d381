//! Tool catalog loading and installation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::{AdapterFactory, CatalogEntry, CatalogError};
use crate::domain::intent::SharedPatternBook;
use crate::domain::registry::SharedToolRegistry;

const BUILTIN_CATALOG: &str = include_str!("builtin.yaml");

/// An ordered list of tool entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCatalog {
    #[serde(default)]
    tools: Vec<CatalogEntry>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<CatalogEntry>) -> Self {
        Self { tools }
    }

    /// The default weather, news, currency, movie, recipe and calculator tools.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a catalog file, choosing the format by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content),
            "json" => Self::from_json_str(&content),
            other => Err(CatalogError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registers every entry in order, stopping at the first failure.
    ///
    /// Entries installed before the failure stay registered.
    pub fn install(
        &self,
        registry: &SharedToolRegistry,
        book: &SharedPatternBook,
        factory: &AdapterFactory,
    ) -> Result<usize, CatalogError> {
        for entry in &self.tools {
            install_entry(entry.clone(), registry, book, factory)?;
        }
        info!(count = self.tools.len(), "Tool catalog installed");
        Ok(self.tools.len())
    }
}

/// Validates one entry, registers it with its adapter and adds its phrase
/// templates.
pub fn install_entry(
    entry: CatalogEntry,
    registry: &SharedToolRegistry,
    book: &SharedPatternBook,
    factory: &AdapterFactory,
) -> Result<(), CatalogError> {
    entry.validate()?;
    let adapter = factory.build(&entry)?;
    let name = entry.name().to_string();

    registry.register(entry.spec, adapter)?;
    book.add(&name, &entry.patterns)
        .map_err(|source| CatalogError::Pattern {
            tool: name.clone(),
            source,
        })?;

    info!(tool = %name, patterns = entry.patterns.len(), "Tool registered");
    Ok(())
}
