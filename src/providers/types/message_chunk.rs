use serde::{Deserialize, Serialize};

/// Represents a chunk of a streaming message from a provider
#[derive(Debug, Clone, PartialEq)]
pub enum MessageChunk {
    /// A chunk containing text content
    Text(String),
    /// A fragment of a tool call, see [`ToolCallChunk`]
    ToolCall(ToolCallChunk),
    /// Stream end marker with finish reason
    End(FinishReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    /// The model finished generating content
    Stop,
    /// The model stopped to let the caller run tools
    ToolCalls,
    /// The model encountered an error
    Error(String),
}

/// One incremental piece of a streamed tool call.
///
/// The id and name usually arrive on the first fragment only; argument text
/// is a slice of a JSON document and only means something once every
/// fragment for the same id has been concatenated in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

impl ToolCallChunk {
    pub fn new(id: Option<&str>, name: Option<&str>, args: Option<&str>) -> Self {
        Self {
            id: id.map(String::from),
            name: name.map(String::from),
            args: args.map(String::from),
        }
    }
}

impl MessageChunk {
    /// Create a new end chunk with a stop reason
    pub const fn stop() -> Self {
        Self::End(FinishReason::Stop)
    }

    /// Create a new end chunk with an error reason
    pub const fn error(error: String) -> Self {
        Self::End(FinishReason::Error(error))
    }
}
