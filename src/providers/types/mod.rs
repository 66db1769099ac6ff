pub mod message_chunk;
pub mod messages;
pub mod response;

pub use message_chunk::{FinishReason, MessageChunk, ToolCallChunk};
pub use messages::Message;
pub use response::{ModelResponse, ResponseMetadata, ResponsePayload, TokenUsage};
