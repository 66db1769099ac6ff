use std::fmt::Display;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::ToolError;

/// Arguments of a tool call, always a JSON object
pub type ToolArguments = Map<String, Value>;

/// Represents a tool call with its identifier, name, and arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier correlating the call with its result message
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Parsed arguments passed to the tool
    pub arguments: ToolArguments,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: ToolArguments) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

impl Display for ToolCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, Value::Object(self.arguments.clone()))
    }
}

/// Defines a tool's interface including its name, description, and parameter schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name of the tool
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON schema defining the tool's parameters
    pub parameters: Value,
}

/// Trait implemented by tools the agent runs itself
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's definition including its name, description, and parameter schema
    fn definition(&self) -> ToolDefinition;

    /// Executes the tool with the provided arguments
    async fn execute(&self, arguments: &ToolArguments) -> Result<Value, ToolError>;
}
