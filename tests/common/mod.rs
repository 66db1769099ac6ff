#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chat_agents::core::{AgentConfig, ChatAgent, LLMError};
use chat_agents::providers::{BoxStream, LLMClient, Message, MessageChunk, ModelResponse};
use chat_agents::tools::{ToolDefinition, ToolRegistry, WeatherTool};
use serde_json::{Map, Value};

/// Replays canned responses and records what the agent sent
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<ModelResponse, LLMError>>>,
    streams: Mutex<VecDeque<Vec<MessageChunk>>>,
    pub requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(results: Vec<Result<ModelResponse, LLMError>>) -> Self {
        Self {
            responses: Mutex::new(results.into()),
            streams: Mutex::new(VecDeque::new()),
            requests: Default::default(),
        }
    }

    pub fn streaming(streams: Vec<Vec<MessageChunk>>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            streams: Mutex::new(streams.into()),
            requests: Default::default(),
        }
    }

    fn record(&self, messages: &[Message]) {
        self.requests.lock().unwrap().push(messages.to_vec());
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn query(
        &self,
        messages: &[Message],
        _tools: Option<&[ToolDefinition]>,
    ) -> Result<ModelResponse, LLMError> {
        self.record(messages);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LLMError::ResponseFormat(String::from("script exhausted"))))
    }

    async fn query_streaming(
        &self,
        messages: &[Message],
        _tools: Option<&[ToolDefinition]>,
    ) -> Result<BoxStream, LLMError> {
        self.record(messages);
        let chunks = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LLMError::StreamError(String::from("script exhausted")))?;
        Ok(Box::pin(futures::stream::iter(chunks.into_iter().map(Ok))))
    }
}

pub fn agent_config(stream: bool) -> AgentConfig {
    AgentConfig {
        model: String::from("scripted"),
        base_url: String::from("http://localhost:0/v1"),
        base_url_env: None,
        api_key_env: None,
        system_prompt: Some(String::from("Be brief.")),
        temperature: 0.0,
        presence_penalty: None,
        frequency_penalty: None,
        max_tokens: None,
        parallel_tool_calls: None,
        stream,
        backend_tools: vec![String::from("get_weather")],
    }
}

pub fn agent(client: ScriptedClient, stream: bool, max_steps: u32) -> ChatAgent {
    let mut tools = ToolRegistry::new();
    tools.register(WeatherTool);
    ChatAgent::new("test", agent_config(stream), Box::new(client), tools, max_steps)
}

pub fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("arguments must be an object"),
    }
}
