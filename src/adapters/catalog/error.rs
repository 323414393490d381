use std::path::PathBuf;

use thiserror::Error;

use crate::domain::registry::RegistryError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported catalog format '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("Invalid YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tool '{tool}' must declare exactly one of 'http' or 'builtin'")]
    AdapterChoice { tool: String },

    #[error("Invalid phrase template for '{tool}': {source}")]
    Pattern {
        tool: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
