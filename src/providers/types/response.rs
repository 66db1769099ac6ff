use serde::{Deserialize, Serialize};

use super::message_chunk::ToolCallChunk;
use crate::tools::ToolCall;

/// A completed model invocation, before tool calls are normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub content: String,
    pub metadata: ResponseMetadata,
    pub payload: ResponsePayload,
}

/// How the provider delivered the tool calls of a response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// Fully formed calls with parsed arguments
    ToolCalls(Vec<ToolCall>),
    /// Raw fragments that still have to be merged per call id
    Chunks(Vec<ToolCallChunk>),
    /// No tool activity at all
    Plain,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ModelResponse {
    /// Picks the payload variant: formed calls win over fragments, and
    /// empty collections fall through to the next option.
    pub fn new(
        content: impl Into<String>,
        tool_calls: Vec<ToolCall>,
        chunks: Vec<ToolCallChunk>,
        metadata: ResponseMetadata,
    ) -> Self {
        let payload = if !tool_calls.is_empty() {
            ResponsePayload::ToolCalls(tool_calls)
        } else if !chunks.is_empty() {
            ResponsePayload::Chunks(chunks)
        } else {
            ResponsePayload::Plain
        };

        Self {
            content: content.into(),
            metadata,
            payload,
        }
    }

    pub fn plain(content: impl Into<String>) -> Self {
        Self::new(content, Vec::new(), Vec::new(), ResponseMetadata::default())
    }

    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::new(content, tool_calls, Vec::new(), ResponseMetadata::default())
    }

    pub fn with_chunks(content: impl Into<String>, chunks: Vec<ToolCallChunk>) -> Self {
        Self::new(content, Vec::new(), chunks, ResponseMetadata::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn test_formed_calls_take_precedence_over_chunks() {
        let call = ToolCall::new("call_1", "get_weather", Map::new());
        let chunk = ToolCallChunk::new(Some("call_2"), Some("noop"), Some("{}"));
        let response = ModelResponse::new(
            "",
            vec![call.clone()],
            vec![chunk],
            ResponseMetadata::default(),
        );
        assert_eq!(response.payload, ResponsePayload::ToolCalls(vec![call]));
    }

    #[test]
    fn test_empty_collections_make_a_plain_response() {
        let response = ModelResponse::plain("hello");
        assert_eq!(response.payload, ResponsePayload::Plain);
        assert_eq!(response.content, "hello");
    }
}
