use std::borrow::Cow;

use crate::providers::types::messages::Message as LLMMessage;
use crate::tools::ToolCall as LLMToolCall;
use crate::tools::ToolDefinition as LLMToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "role")]
#[serde(rename_all = "lowercase")]
pub enum Message<'a> {
    System {
        content: Cow<'a, str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    User {
        content: Cow<'a, str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Assistant {
        /// `null` when the model only produced tool calls
        #[serde(default)]
        content: Option<Cow<'a, str>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        refusal: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },
    Tool {
        content: Cow<'a, str>,
        tool_call_id: Cow<'a, str>,
    },
}

impl<'a> Message<'a> {
    pub const fn system(content: Cow<'a, str>) -> Self {
        Self::System {
            content,
            name: None,
        }
    }

    pub const fn user(content: Cow<'a, str>) -> Self {
        Self::User {
            content,
            name: None,
        }
    }

    pub const fn assistant(content: Cow<'a, str>, tool_calls: Option<Vec<ToolCall>>) -> Self {
        Self::Assistant {
            content: Some(content),
            refusal: None,
            tool_calls,
        }
    }

    pub const fn tool(content: Cow<'a, str>, tool_call_id: Cow<'a, str>) -> Self {
        Self::Tool {
            content,
            tool_call_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum CallType {
    #[serde(rename = "function")]
    Function,
}

/// Function call as sent over the wire; `arguments` is JSON-encoded text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Serialize)]
pub struct Tool<'a> {
    #[serde(rename = "type")]
    pub tool_type: CallType,
    pub function: Function<'a>,
}

impl<'a> From<&'a LLMToolDefinition> for Tool<'a> {
    fn from(tool_definition: &'a LLMToolDefinition) -> Self {
        Self {
            tool_type: CallType::Function,
            function: Function {
                name: tool_definition.name.as_str(),
                description: Some(tool_definition.description.as_str()),
                parameters: &tool_definition.parameters,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Function<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub parameters: &'a Value,
}

impl From<&LLMToolCall> for ToolCall {
    fn from(call: &LLMToolCall) -> Self {
        Self {
            id: call.id.clone(),
            call_type: CallType::Function,
            function: FunctionCall {
                name: call.name.clone(),
                arguments: Value::Object(call.arguments.clone()).to_string(),
            },
        }
    }
}

impl<'a> From<&'a LLMMessage> for Message<'a> {
    fn from(msg: &'a LLMMessage) -> Self {
        match msg {
            LLMMessage::System { content } => Self::system(Cow::Borrowed(content)),
            LLMMessage::User { content } => Self::user(Cow::Borrowed(content)),
            LLMMessage::Assistant {
                content,
                tool_calls,
            } => {
                let tool_calls = (!tool_calls.is_empty())
                    .then(|| tool_calls.iter().map(ToolCall::from).collect());
                Self::assistant(Cow::Borrowed(content), tool_calls)
            }
            LLMMessage::ToolResult {
                content,
                tool_call_id,
            } => Self::tool(Cow::Borrowed(content), Cow::Borrowed(tool_call_id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    /// Vendor-specific reasons, e.g. `function_call` or `insufficient_system_resource`
    #[serde(other)]
    Other,
}

impl FinishReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ContentFilter => "content_filter",
            Self::ToolCalls => "tool_calls",
            Self::Other => "other",
        }
    }
}
