pub mod llm;
pub mod openai;
pub mod types;

pub use llm::{collect_response, BoxStream, LLMClient};
pub use openai::OpenAIClient;
pub use types::{
    FinishReason, Message, MessageChunk, ModelResponse, ResponseMetadata, ResponsePayload,
    TokenUsage, ToolCallChunk,
};
