//! MCP tool implementations.

pub mod create_vex_statement;
pub mod merge_vex_documents;
pub mod registry;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

pub use create_vex_statement::CreateVexStatementTool;
pub use merge_vex_documents::MergeVexDocumentsTool;
pub use registry::ToolRegistry;

/// A named, schema-described operation callable through `tools/call`.
///
/// `execute` returns `Err` only for protocol problems such as undecodable
/// arguments. Domain failures come back as `Ok` with `isError` set.
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn definition(&self) -> ToolDefinition;

    fn execute(&self, args: Value) -> McpResult<ToolCallResult>;
}

/// Decode tool arguments. Only a JSON object is accepted; serde would
/// otherwise fill a struct from an array by position.
fn decode_arguments<T: DeserializeOwned>(args: Value) -> McpResult<T> {
    if !args.is_object() {
        return Err(McpError::InvalidParams(
            "tool arguments must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))
}
