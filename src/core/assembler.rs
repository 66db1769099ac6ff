//! Turns a model response into an assistant message with complete tool calls.
//!
//! Providers either hand back fully formed calls or, when the response was
//! streamed, a flat list of fragments. Fragments are merged per call id in
//! arrival order and their argument text is parsed once at the end.

use std::collections::HashMap;

use log::warn;
use serde_json::Value;

use crate::providers::{Message, ModelResponse, ResponsePayload, ToolCallChunk};
use crate::tools::{ToolArguments, ToolCall};

/// Normalizes `response` into an assistant message and the list of calls it carries.
///
/// Never fails: argument text that is not a JSON object is logged and
/// replaced by an empty object.
pub fn assemble(response: ModelResponse) -> (Message, Vec<ToolCall>) {
    let ModelResponse {
        content, payload, ..
    } = response;

    let tool_calls = match payload {
        ResponsePayload::ToolCalls(calls) => calls,
        ResponsePayload::Chunks(chunks) => {
            let mut accumulator = ToolCallAccumulator::default();
            for chunk in &chunks {
                accumulator.push(chunk);
            }
            accumulator.finalize()
        }
        ResponsePayload::Plain => Vec::new(),
    };

    (Message::assistant(content, tool_calls.clone()), tool_calls)
}

/// A call under reconstruction
#[derive(Debug)]
struct AccumulatedToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl AccumulatedToolCall {
    fn finalize(self) -> ToolCall {
        let arguments = parse_arguments(&self.id, &self.name, &self.arguments);
        ToolCall {
            id: self.id,
            name: self.name,
            arguments,
        }
    }
}

/// Groups fragments by call id, keeping ids in first-seen order.
///
/// A fragment with no id is grouped under the empty id.
#[derive(Debug, Default)]
struct ToolCallAccumulator {
    calls: Vec<AccumulatedToolCall>,
    index: HashMap<String, usize>,
}

impl ToolCallAccumulator {
    fn push(&mut self, chunk: &ToolCallChunk) {
        let id = chunk.id.as_deref().unwrap_or_default();
        let slot = match self.index.get(id) {
            Some(&slot) => slot,
            None => {
                self.calls.push(AccumulatedToolCall {
                    id: id.to_string(),
                    name: String::new(),
                    arguments: String::new(),
                });
                self.index.insert(id.to_string(), self.calls.len() - 1);
                self.calls.len() - 1
            }
        };

        let call = &mut self.calls[slot];
        if let Some(args) = chunk.args.as_deref() {
            call.arguments.push_str(args);
        }
        if let Some(name) = chunk.name.as_deref().filter(|name| !name.is_empty()) {
            if call.name.is_empty() {
                call.name = name.to_string();
            }
        }
    }

    fn finalize(self) -> Vec<ToolCall> {
        self.calls
            .into_iter()
            .map(AccumulatedToolCall::finalize)
            .collect()
    }
}

fn parse_arguments(id: &str, name: &str, text: &str) -> ToolArguments {
    if text.is_empty() {
        return ToolArguments::new();
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(arguments)) => arguments,
        Ok(other) => {
            warn!("[Assembler] arguments of tool call {id:?} ({name}) are not an object: {other}");
            ToolArguments::new()
        }
        Err(e) => {
            warn!(
                "[Assembler] failed to parse arguments of tool call {id:?} ({name}): {e}, \
                 text: {text:?}"
            );
            ToolArguments::new()
        }
    }
}
