use crate::core::agent::ChatAgent;
use crate::core::{Config, LLMError};

/// Agents declared in the configuration, built on demand so that listing
/// them never requires credentials.
pub struct AgentRegistry {
    config: Config,
}

impl AgentRegistry {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn names(&self) -> Vec<String> {
        self.config.agent_names()
    }

    pub fn default_name(&self) -> &str {
        &self.config.default_agent
    }

    /// Builds the agent registered under `name`.
    pub fn agent(&self, name: &str) -> Result<ChatAgent, LLMError> {
        let agent_config = self
            .config
            .agent(name)
            .ok_or_else(|| LLMError::AgentNotFound {
                name: name.to_string(),
                available: self.names(),
            })?;
        ChatAgent::from_config(name, agent_config, self.config.max_steps)
    }
}
