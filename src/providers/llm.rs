use crate::core::LLMError;
use crate::providers::{FinishReason, Message, MessageChunk, ModelResponse, ResponseMetadata};
use crate::tools::ToolDefinition;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;

pub type BoxStream = Pin<Box<dyn Stream<Item = Result<MessageChunk, LLMError>> + Send + 'static>>;

#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Query the LLM with a list of messages and optional tools
    async fn query(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ModelResponse, LLMError>;

    /// Query the LLM with streaming response and optional tools
    async fn query_streaming(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<BoxStream, LLMError>;
}

/// Drains a chunk stream into a single response.
///
/// Tool call fragments are kept as-is; merging them is the assembler's job.
pub async fn collect_response(mut stream: BoxStream) -> Result<ModelResponse, LLMError> {
    let mut content = String::new();
    let mut chunks = Vec::new();
    let mut finish_reason = None;

    while let Some(chunk) = stream.next().await {
        match chunk? {
            MessageChunk::Text(text) => content.push_str(&text),
            MessageChunk::ToolCall(chunk) => chunks.push(chunk),
            MessageChunk::End(FinishReason::Stop) => {
                finish_reason = Some("stop");
                break;
            }
            MessageChunk::End(FinishReason::ToolCalls) => {
                finish_reason = Some("tool_calls");
                break;
            }
            MessageChunk::End(FinishReason::Error(error)) => {
                return Err(LLMError::StreamError(error));
            }
        }
    }

    let metadata = ResponseMetadata {
        finish_reason: finish_reason.map(String::from),
        ..ResponseMetadata::default()
    };
    Ok(ModelResponse::new(content, Vec::new(), chunks, metadata))
}
