use std::collections::HashMap;

use crate::core::{AgentConfig, Endpoint, LLMError};
use crate::providers::llm::{BoxStream, LLMClient};
use crate::providers::Message as LLMMessage;
use crate::providers::MessageChunk as LLMMessageChunk;
use crate::providers::{ModelResponse, ResponseMetadata, ToolCallChunk};
use crate::tools::{ToolCall as LLMToolCall, ToolDefinition as LLMToolDefinition};
use async_stream::try_stream;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use super::types::chat_completion_object::Choice;
use super::types::message::{FinishReason, ToolCall};
use super::types::{
    ChatCompletionChunk, ChatCompletionObject, ChatCompletionRequest, Message,
    OpenAIErrorResponse, Tool,
};

const COMPLETIONS_PATH: &str = "/chat/completions";
const DONE_MARKER: &str = "[DONE]";

/// Client for OpenAI-compatible Chat Completions endpoints
///
/// Works against any vendor that mirrors the OpenAI wire format (DeepSeek,
/// Qwen/DashScope, local servers); the base URL and key come from the
/// agent's [`Endpoint`].
pub struct OpenAIClient {
    endpoint: Endpoint,
    client: Client,
    config: AgentConfig,
}

impl OpenAIClient {
    /// Creates a new client for the given endpoint and agent settings
    pub fn new(endpoint: Endpoint, config: AgentConfig) -> Self {
        Self {
            endpoint,
            client: Client::new(),
            config,
        }
    }

    fn build_request<'a>(
        &'a self,
        messages: &'a [LLMMessage],
        tools: Option<&'a [LLMToolDefinition]>,
        stream: bool,
    ) -> ChatCompletionRequest<'a> {
        let tools = tools
            .filter(|tools| !tools.is_empty())
            .map(|tools| tools.iter().map(Tool::from).collect::<Vec<_>>());
        let parallel_tool_calls = tools
            .as_ref()
            .and(self.config.parallel_tool_calls);

        ChatCompletionRequest {
            model: &self.config.model,
            messages: messages.iter().map(Message::from).collect(),
            temperature: Some(self.config.temperature),
            presence_penalty: self.config.presence_penalty,
            frequency_penalty: self.config.frequency_penalty,
            max_tokens: self.config.max_tokens,
            tools,
            parallel_tool_calls,
            stream,
        }
    }

    /// Sends a chat completion request and maps non-success statuses to errors
    pub async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest<'_>,
    ) -> Result<Response, LLMError> {
        let mut builder = self
            .client
            .post(format!("{}{COMPLETIONS_PATH}", self.endpoint.base_url))
            .json(request);
        if let Some(api_key) = &self.endpoint.api_key {
            builder = builder.bearer_auth(api_key);
        }
        let response = builder.send().await.map_err(LLMError::from)?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let detail = serde_json::from_str::<OpenAIErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LLMError::Authentication(
                format!("Invalid API key or unauthorized access: {detail}"),
            ),
            StatusCode::TOO_MANY_REQUESTS => LLMError::RateLimited(detail),
            status if status.is_server_error() => {
                LLMError::ServerError(format!("status {status}: {detail}"))
            }
            status => LLMError::ApiError(format!(
                "API request failed with status {status}: {detail}"
            )),
        })
    }
}

#[async_trait::async_trait]
impl LLMClient for OpenAIClient {
    async fn query(
        &self,
        messages: &[LLMMessage],
        tools: Option<&[LLMToolDefinition]>,
    ) -> Result<ModelResponse, LLMError> {
        let request = self.build_request(messages, tools, false);
        let response = self.create_chat_completion(&request).await?;
        let response_text = response
            .text()
            .await
            .map_err(|e| LLMError::ResponseFormat(format!("Failed to get response text: {e}")))?;
        let completion: ChatCompletionObject = serde_json::from_str(&response_text)
            .map_err(|e| LLMError::ResponseFormat(format!("Failed to parse completion: {e}")))?;

        let ChatCompletionObject {
            model,
            choices,
            usage,
            ..
        } = completion;
        let choice = choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::ResponseFormat("Completion has no choices".to_string()))?;

        Ok(into_model_response(choice, model, usage.map(Into::into)))
    }

    async fn query_streaming(
        &self,
        messages: &[LLMMessage],
        tools: Option<&[LLMToolDefinition]>,
    ) -> Result<BoxStream, LLMError> {
        let request = self.build_request(messages, tools, true);
        let response = self.create_chat_completion(&request).await?;
        let events = Box::pin(response.bytes_stream().eventsource());
        let chunks = process_stream(events);

        Ok(events_to_messages(chunks).boxed())
    }
}

/// Converts a non-streamed choice into a model response.
///
/// Calls whose argument text is not a JSON object are handed on as raw
/// fragments so the assembler applies its recovery policy to them.
fn into_model_response(
    choice: Choice<'_>,
    model: String,
    usage: Option<crate::providers::TokenUsage>,
) -> ModelResponse {
    let metadata = ResponseMetadata {
        model: Some(model),
        finish_reason: choice.finish_reason.as_ref().map(|r| r.as_str().to_string()),
        usage,
    };

    let (content, raw_calls) = match choice.message {
        Message::Assistant {
            content,
            tool_calls,
            ..
        } => (
            content.map(|c| c.into_owned()).unwrap_or_default(),
            tool_calls.unwrap_or_default(),
        ),
        Message::System { content, .. }
        | Message::User { content, .. }
        | Message::Tool { content, .. } => (content.into_owned(), Vec::new()),
    };

    let parsed: Option<Vec<LLMToolCall>> = raw_calls.iter().map(parse_tool_call).collect();
    match parsed {
        Some(tool_calls) => ModelResponse::new(content, tool_calls, Vec::new(), metadata),
        None => {
            debug!("[OpenAI] tool call arguments did not parse, forwarding as fragments");
            let chunks = raw_calls
                .into_iter()
                .map(|call| ToolCallChunk {
                    id: Some(call.id),
                    name: Some(call.function.name),
                    args: Some(call.function.arguments),
                })
                .collect();
            ModelResponse::new(content, Vec::new(), chunks, metadata)
        }
    }
}

fn parse_tool_call(call: &ToolCall) -> Option<LLMToolCall> {
    let arguments = if call.function.arguments.trim().is_empty() {
        serde_json::Map::new()
    } else {
        match serde_json::from_str::<Value>(&call.function.arguments).ok()? {
            Value::Object(arguments) => arguments,
            _ => return None,
        }
    };
    Some(LLMToolCall::new(
        call.id.clone(),
        call.function.name.clone(),
        arguments,
    ))
}

fn events_to_messages(
    mut stream: impl Stream<Item = Result<ChatCompletionChunk, LLMError>> + Send + Unpin + 'static,
) -> impl Stream<Item = Result<LLMMessageChunk, LLMError>> + Send + 'static {
    try_stream! {
        // Deltas after the first one for a call usually omit the id
        let mut call_ids: HashMap<u32, String> = HashMap::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for choice in chunk.choices {
                let delta = choice.delta;
                if let Some(content) = delta.content.filter(|c| !c.is_empty()) {
                    yield LLMMessageChunk::Text(content);
                }
                for tool_call in delta.tool_calls.unwrap_or_default() {
                    if let Some(id) = tool_call.id.as_deref().filter(|id| !id.is_empty()) {
                        call_ids.insert(tool_call.index, id.to_string());
                    }
                    let id = call_ids.get(&tool_call.index).cloned().or(tool_call.id);
                    yield LLMMessageChunk::ToolCall(ToolCallChunk {
                        id,
                        name: tool_call.function.name,
                        args: tool_call.function.arguments,
                    });
                }

                if let Some(finish_reason) = choice.finish_reason {
                    match finish_reason {
                        FinishReason::Stop | FinishReason::Other => yield LLMMessageChunk::stop(),
                        FinishReason::ToolCalls => yield LLMMessageChunk::End(
                            crate::providers::FinishReason::ToolCalls
                        ),
                        FinishReason::Length => yield LLMMessageChunk::error(
                            "Response exceeded max tokens".to_string()
                        ),
                        FinishReason::ContentFilter => yield LLMMessageChunk::error(
                            "Content filter triggered".to_string()
                        ),
                    }
                }
            }
        }
    }
}

fn process_stream(
    mut stream: impl Stream<Item = Result<Event, EventStreamError<reqwest::Error>>>
        + Send
        + Unpin
        + 'static,
) -> impl Stream<Item = Result<ChatCompletionChunk, LLMError>> + Send + Unpin + 'static {
    let res = try_stream! {
        while let Some(event) = stream.next().await {
            match event {
                Ok(event) => {
                    if event.data == DONE_MARKER {
                        continue;
                    }
                    yield parse_chunk(&event)?;
                }
                Err(e) => Err(LLMError::StreamError(e.to_string()))?
            }
        }
    };
    Box::pin(res)
}

fn parse_chunk(event: &Event) -> Result<ChatCompletionChunk, LLMError> {
    if event.data.is_empty() {
        Err(LLMError::ResponseFormat("Empty data".to_string()))
    } else {
        serde_json::from_str(&event.data)
            .map_err(|e| LLMError::ResponseFormat(format!("Invalid JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assembler::assemble;
    use crate::providers::llm::collect_response;
    use crate::providers::ResponsePayload;
    use once_cell::sync::Lazy;
    use serde_json::json;

    static CONFIG: Lazy<AgentConfig> = Lazy::new(|| AgentConfig {
        model: String::from("deepseek-chat"),
        base_url: String::from("http://localhost:9/v1"),
        base_url_env: None,
        api_key_env: None,
        system_prompt: None,
        temperature: 0.0,
        presence_penalty: Some(0.5),
        frequency_penalty: Some(0.5),
        max_tokens: Some(512),
        parallel_tool_calls: Some(false),
        stream: false,
        backend_tools: vec![String::from("get_weather")],
    });

    fn client() -> OpenAIClient {
        let endpoint = Endpoint {
            base_url: CONFIG.base_url.clone(),
            api_key: None,
        };
        OpenAIClient::new(endpoint, CONFIG.clone())
    }

    fn chunk_stream(
        payloads: Vec<Value>,
    ) -> impl Stream<Item = Result<ChatCompletionChunk, LLMError>> + Send + Unpin + 'static {
        let chunks: Vec<Result<ChatCompletionChunk, LLMError>> = payloads
            .into_iter()
            .map(|p| serde_json::from_value(p).map_err(|e| LLMError::ResponseFormat(e.to_string())))
            .collect();
        futures::stream::iter(chunks)
    }

    #[test]
    fn test_request_binds_tools_and_parallel_flag() {
        let client = client();
        let messages = vec![LLMMessage::system("Be brief."), LLMMessage::user("Weather?")];
        let tools = vec![crate::tools::Tool::definition(&crate::tools::WeatherTool)];

        let request = client.build_request(&messages, Some(tools.as_slice()), false);
        let wire = serde_json::to_value(&request).expect("serialize");

        assert_eq!(wire["model"], "deepseek-chat");
        assert_eq!(wire["messages"][0], json!({"role": "system", "content": "Be brief."}));
        assert_eq!(wire["tools"][0]["function"]["name"], "get_weather");
        assert_eq!(wire["parallel_tool_calls"], false);
        assert_eq!(wire["presence_penalty"], 0.5);
        assert_eq!(wire["max_tokens"], 512);
        assert!(wire.get("stream").is_none());
    }

    #[test]
    fn test_request_without_tools_omits_parallel_flag() {
        let client = client();
        let messages = vec![LLMMessage::user("Hi")];

        let request = client.build_request(&messages, Some(&[][..]), true);
        let wire = serde_json::to_value(&request).expect("serialize");

        assert!(wire.get("tools").is_none());
        assert!(wire.get("parallel_tool_calls").is_none());
        assert_eq!(wire["stream"], true);
    }

    #[test]
    fn test_completion_with_tool_calls_is_preformed() {
        let completion: ChatCompletionObject = serde_json::from_value(json!({
            "id": "cmpl-1",
            "model": "deepseek-chat",
            "choices": [{
                "index": 0,
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "get_weather", "arguments": "{\"location\":\"Paris\"}" }
                    }]
                }
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }))
        .expect("deserialize");

        let choice = completion.choices.into_iter().next().expect("choice");
        let response = into_model_response(choice, completion.model, completion.usage.map(Into::into));

        assert_eq!(response.metadata.finish_reason.as_deref(), Some("tool_calls"));
        assert_eq!(response.metadata.usage.map(|u| u.total_tokens), Some(15));
        match response.payload {
            ResponsePayload::ToolCalls(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].arguments["location"], "Paris");
            }
            other => panic!("expected formed calls, got {other:?}"),
        }
    }

    #[test]
    fn test_completion_with_broken_arguments_becomes_fragments() {
        let completion: ChatCompletionObject = serde_json::from_value(json!({
            "model": "qwen-plus",
            "choices": [{
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "change_background", "arguments": "{\"background\":" }
                    }]
                }
            }]
        }))
        .expect("deserialize");

        let choice = completion.choices.into_iter().next().expect("choice");
        let response = into_model_response(choice, completion.model, None);
        assert!(matches!(response.payload, ResponsePayload::Chunks(_)));

        let (_, calls) = assemble(response);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].name, "change_background");
        assert!(calls[0].arguments.is_empty());
    }

    #[tokio::test]
    async fn test_stream_deltas_are_stamped_with_call_id() {
        let stream = chunk_stream(vec![
            json!({"choices": [{"index": 0, "delta": {"role": "assistant", "content": "Let me check."}}]}),
            json!({"choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 0, "id": "call_a", "type": "function", "function": {"name": "get_weather", "arguments": ""}}
            ]}}]}),
            json!({"choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 0, "function": {"arguments": "{\"location\":"}}
            ]}}]}),
            json!({"choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 0, "function": {"arguments": "\"Paris\"}"}}
            ]}}]}),
            json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "tool_calls"}]}),
        ]);

        let messages = events_to_messages(stream).boxed();
        let response = collect_response(messages).await.expect("stream should collect");
        assert_eq!(response.content, "Let me check.");

        let (message, calls) = assemble(response);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[0].arguments["location"], "Paris");
        assert_eq!(message.content(), "Let me check.");
    }

    #[tokio::test]
    async fn test_stream_without_ids_leaves_fragments_unkeyed() {
        let stream = chunk_stream(vec![
            json!({"choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 0, "function": {"name": "get_weather", "arguments": "{}"}},
                {"index": 1, "function": {"name": "change_background", "arguments": ""}}
            ]}}]}),
            json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "tool_calls"}]}),
        ]);

        let chunks: Vec<LLMMessageChunk> = events_to_messages(stream)
            .map(|chunk| chunk.expect("chunk"))
            .collect()
            .await;

        let ids: Vec<Option<String>> = chunks
            .iter()
            .filter_map(|chunk| match chunk {
                LLMMessageChunk::ToolCall(call) => Some(call.id.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec![None, None]);
    }

    #[tokio::test]
    async fn test_stream_length_finish_is_an_error() {
        let stream = chunk_stream(vec![
            json!({"choices": [{"index": 0, "delta": {"content": "partial"}}]}),
            json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "length"}]}),
        ]);

        let result = collect_response(events_to_messages(stream).boxed()).await;
        assert!(matches!(result, Err(LLMError::StreamError(msg)) if msg.contains("max tokens")));
    }

    #[test]
    fn test_empty_event_data_is_rejected() {
        let event = Event {
            event: String::from("message"),
            data: String::new(),
            id: String::new(),
            retry: None,
        };
        assert!(matches!(parse_chunk(&event), Err(LLMError::ResponseFormat(_))));
    }
}
