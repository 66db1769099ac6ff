pub mod cli;
pub mod core;
pub mod providers;
pub mod tools;

pub use crate::core::{assemble, AgentRegistry, AgentState, ChatAgent, Config, LLMError};
pub use providers::{LLMClient, Message, ModelResponse, OpenAIClient, ToolCallChunk};
pub use tools::{ToolCall, ToolDefinition};
