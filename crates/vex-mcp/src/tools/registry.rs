//! Tool registration and lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::client::VexClient;
use crate::types::{McpError, McpResult, ToolDefinition};

use super::{CreateVexStatementTool, MergeVexDocumentsTool, Tool};

/// Insertion-ordered set of tools keyed by name. Filled at startup, then
/// shared read-only behind an `Arc`.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the VEX tool catalog.
    pub fn with_vex_tools(client: Arc<VexClient>) -> McpResult<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(CreateVexStatementTool::new(client.clone())))?;
        registry.register(Arc::new(MergeVexDocumentsTool::new(client)))?;
        Ok(registry)
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> McpResult<()> {
        let name = tool.name();
        if self.by_name.contains_key(name) {
            return Err(McpError::DuplicateTool(name.to_string()));
        }
        self.by_name.insert(name, self.tools.len());
        self.tools.push(tool);
        tracing::debug!("Registered tool {name}");
        Ok(())
    }

    pub fn get(&self, name: &str) -> McpResult<Arc<dyn Tool>> {
        self.by_name
            .get(name)
            .map(|&i| self.tools[i].clone())
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))
    }

    /// Definitions in registration order.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
