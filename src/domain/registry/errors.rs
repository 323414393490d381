//! Error types for the tool registry

/// Registry errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid spec for tool '{tool}': {reason}")]
    InvalidSpec { tool: String, reason: String },
}
