pub mod agent;
pub mod agents;
pub mod assembler;
mod config;
pub mod error;

pub use agent::{AgentState, ChatAgent, TurnOutcome};
pub use agents::AgentRegistry;
pub use assembler::assemble;
pub use config::{AgentConfig, Config, Endpoint};
pub use error::{LLMError, ToolError};
