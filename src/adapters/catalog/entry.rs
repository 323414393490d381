//! One tool as declared in a catalog file.

use serde::{Deserialize, Serialize};

use super::CatalogError;
use crate::adapters::tools::HttpTemplate;
use crate::domain::intent::PhraseTemplate;
use crate::domain::registry::ToolSpec;

/// Tools implemented in-process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinTool {
    Calculator,
}

/// How a catalog entry is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend<'a> {
    Http(&'a HttpTemplate),
    Builtin(BuiltinTool),
}

/// A tool spec plus its adapter binding and phrase templates.
///
/// ```yaml
/// name: movie
/// description: Search for movies
/// parameters:
///   - name: title
///     type: string
/// outputs: [title]
/// http:
///   endpoint: https://example.com/movies
/// patterns:
///   - "find (?:the )?movie (?P<title>.+)"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub spec: ToolSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpTemplate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<BuiltinTool>,

    /// Regex phrase templates; named groups are parameter names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
}

impl CatalogEntry {
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn backend(&self) -> Result<Backend<'_>, CatalogError> {
        match (&self.http, self.builtin) {
            (Some(template), None) => Ok(Backend::Http(template)),
            (None, Some(builtin)) => Ok(Backend::Builtin(builtin)),
            _ => Err(CatalogError::AdapterChoice {
                tool: self.name().to_string(),
            }),
        }
    }

    /// Checks the spec, the adapter binding and every phrase template.
    pub fn validate(&self) -> Result<(), CatalogError> {
        self.spec.validate()?;
        self.backend()?;
        for pattern in &self.patterns {
            PhraseTemplate::compile(pattern).map_err(|source| CatalogError::Pattern {
                tool: self.name().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}
