//! Data transfer objects for tools HTTP endpoints.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// Request DTOs
// ═══════════════════════════════════════════════════════════════════════════

/// Query parameters for listing tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListToolsParams {
    /// Output format: "native" or "openai"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "native".to_string()
}

// ═══════════════════════════════════════════════════════════════════════════
// Response DTOs
// ═══════════════════════════════════════════════════════════════════════════

/// Registry listing in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResponse {
    pub format: String,
    pub count: usize,
    pub tools: serde_json::Value,
}

/// Response after registering or removing a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCommandResponse {
    pub name: String,
    pub message: String,
}
