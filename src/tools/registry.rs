use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::error::ToolError;

use super::types::{Tool, ToolArguments, ToolDefinition};

/// Registry of the backend tools an agent executes itself
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_boxed(Box::new(tool));
    }

    pub fn register_boxed(&mut self, tool: Box<dyn Tool>) {
        let def = tool.definition();
        self.tools.insert(def.name, tool);
    }

    /// Definitions ordered by tool name
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get_tool(&self, name: &str) -> Option<&dyn Tool> {
        Some(self.tools.get(name)?.as_ref())
    }

    pub async fn execute_tool(
        &self,
        name: &str,
        arguments: &ToolArguments,
    ) -> Result<Value, ToolError> {
        let tool = self
            .get_tool(name)
            .ok_or_else(|| ToolError::ToolNotFound(name.to_string()))?;
        tool.execute(arguments).await
    }
}
