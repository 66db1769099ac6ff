use log::{debug, info, warn};
use serde_json::{json, Value};

use crate::core::assembler::assemble;
use crate::core::{AgentConfig, LLMError};
use crate::providers::{collect_response, LLMClient, Message, ModelResponse, OpenAIClient};
use crate::tools::{self, ToolCall, ToolDefinition, ToolRegistry};

/// Conversation handed to an agent for one turn
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    /// Transcript so far, without the system prompt
    pub messages: Vec<Message>,
    /// Tools advertised by the chat UI; calls to them are delegated back
    pub tools: Vec<ToolDefinition>,
}

/// What one turn added to the conversation
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Assistant and tool-result messages produced during the turn, in order
    pub messages: Vec<Message>,
    /// Calls the UI is expected to run
    pub frontend_calls: Vec<ToolCall>,
    /// Number of model invocations the turn needed
    pub steps: u32,
}

impl TurnOutcome {
    /// Final assistant message of the turn
    pub fn reply(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| matches!(m, Message::Assistant { .. }))
    }
}

/// A single-node chat graph: system prompt, transcript and bound tools go
/// in, the model answers, tool calls are settled, and the turn ends.
pub struct ChatAgent {
    name: String,
    config: AgentConfig,
    client: Box<dyn LLMClient>,
    tools: ToolRegistry,
    max_steps: u32,
}

impl ChatAgent {
    /// Creates an agent from its parts.
    ///
    /// # Arguments
    /// * `name` - Name the agent is registered under
    /// * `config` - Prompt and sampling settings
    /// * `client` - Model client the agent talks to
    /// * `tools` - Backend tools executed in-process
    /// * `max_steps` - Model invocations allowed per turn
    pub fn new(
        name: impl Into<String>,
        config: AgentConfig,
        client: Box<dyn LLMClient>,
        tools: ToolRegistry,
        max_steps: u32,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            client,
            tools,
            max_steps,
        }
    }

    /// Builds an agent backed by an OpenAI-compatible endpoint.
    pub fn from_config(name: &str, config: &AgentConfig, max_steps: u32) -> Result<Self, LLMError> {
        let mut registry = ToolRegistry::new();
        for tool_name in &config.backend_tools {
            let tool = tools::builtin_tool(tool_name).ok_or_else(|| {
                LLMError::ConfigError(format!("agent {name} binds unknown tool {tool_name}"))
            })?;
            registry.register_boxed(tool);
        }

        let client = OpenAIClient::new(config.endpoint()?, config.clone());
        Ok(Self::new(
            name,
            config.clone(),
            Box::new(client),
            registry,
            max_steps,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend_tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Runs one turn of the conversation.
    ///
    /// Backend tool calls are executed and fed back to the model; calls to
    /// any other tool are acknowledged and returned to the caller, which
    /// ends the turn.
    ///
    /// # Returns
    /// * `Result<TurnOutcome, LLMError>` - The messages the turn produced or an error
    pub async fn run_turn(&self, state: &AgentState) -> Result<TurnOutcome, LLMError> {
        let mut history = Vec::with_capacity(state.messages.len() + 1);
        history.push(Message::system(self.config.system_prompt()));
        history.extend(state.messages.iter().cloned());
        let turn_start = history.len();

        let mut tool_definitions = state.tools.clone();
        tool_definitions.extend(
            self.tools
                .get_tool_definitions()
                .into_iter()
                .filter(|def| !state.tools.iter().any(|t| t.name == def.name)),
        );
        let bound_tools = (!tool_definitions.is_empty()).then_some(tool_definitions.as_slice());

        let mut call_ids = CallIdAllocator::default();
        let mut frontend_calls = Vec::new();

        for step in 1..=self.max_steps {
            debug!("[Agent {}] step: {step}", self.name);
            let response = self.invoke(&history, bound_tools).await?;
            let (mut message, mut calls) = assemble(response);

            if calls.is_empty() {
                history.push(message);
                debug!("[Agent {}] No tool calls, ending turn", self.name);
                return Ok(TurnOutcome {
                    messages: history.split_off(turn_start),
                    frontend_calls,
                    steps: step,
                });
            }

            call_ids.resolve(&mut calls);
            if let Message::Assistant { tool_calls, .. } = &mut message {
                tool_calls.clone_from(&calls);
            }
            history.push(message);

            let mut ran_backend_tool = false;
            for call in calls {
                if self.tools.contains(&call.name) {
                    let result = self.execute_backend_tool(&call).await;
                    history.push(Message::tool(result, &call.id));
                    ran_backend_tool = true;
                } else {
                    info!(
                        "[Agent {}] delegating {} ({}) to the frontend",
                        self.name, call.name, call.id
                    );
                    history.push(Message::tool(frontend_acknowledgement(&call), &call.id));
                    frontend_calls.push(call);
                }
            }

            if !ran_backend_tool {
                return Ok(TurnOutcome {
                    messages: history.split_off(turn_start),
                    frontend_calls,
                    steps: step,
                });
            }
        }

        Err(LLMError::RecursionLimit(self.max_steps))
    }

    async fn invoke(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ModelResponse, LLMError> {
        if self.config.stream {
            let stream = self.client.query_streaming(messages, tools).await?;
            collect_response(stream).await
        } else {
            self.client.query(messages, tools).await
        }
    }

    /// Runs a backend tool; failures are reported to the model, not raised.
    async fn execute_backend_tool(&self, call: &ToolCall) -> String {
        match self.tools.execute_tool(&call.name, &call.arguments).await {
            Ok(Value::String(text)) => text,
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!("[Agent {}] tool {} failed: {e}", self.name, call.name);
                json!({ "status": "error", "message": e.to_string() }).to_string()
            }
        }
    }
}

/// Result message content for a call the UI runs on its own
fn frontend_acknowledgement(call: &ToolCall) -> String {
    json!({
        "status": "success",
        "message": format!("Tool {} executed successfully on the frontend.", call.name),
    })
    .to_string()
}

/// Hands out `call_<name>_<n>` ids for calls the model left without one.
#[derive(Debug, Default)]
struct CallIdAllocator {
    issued: u32,
}

impl CallIdAllocator {
    fn resolve(&mut self, calls: &mut [ToolCall]) {
        for call in calls.iter_mut().filter(|c| c.id.trim().is_empty()) {
            self.issued += 1;
            call.id = format!("call_{}_{}", call.name, self.issued);
        }
    }
}
