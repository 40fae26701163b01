//! MCP request parameter types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `tools/call` params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}
