use colored::{Color, Colorize};

use crate::providers::Message;

/// Formats a transcript entry for the terminal. User and system messages
/// are not echoed.
pub fn render_message(message: &Message, accent: Color) -> Option<String> {
    match message {
        Message::Assistant {
            content,
            tool_calls,
        } => {
            let mut lines = Vec::new();
            if !content.is_empty() {
                lines.push(format!("{} {content}", "assistant>".color(accent).bold()));
            }
            for call in tool_calls {
                lines.push(format!("  {} {call}", "tool call".dimmed()));
            }
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        Message::ToolResult {
            content,
            tool_call_id,
        } => Some(format!("  {} {content}", format!("[{tool_call_id}]").dimmed())),
        Message::System { .. } | Message::User { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolArguments, ToolCall};
    use serde_json::json;

    fn plain(rendered: Option<String>) -> Option<String> {
        rendered.map(|text| strip_ansi_escapes::strip_str(&text))
    }

    #[test]
    fn test_assistant_reply_with_call() {
        let mut arguments = ToolArguments::new();
        arguments.insert(String::from("location"), json!("Paris"));
        let message = Message::assistant(
            "Checking.",
            vec![ToolCall::new("call_1", "get_weather", arguments)],
        );

        assert_eq!(
            plain(render_message(&message, Color::Cyan)).as_deref(),
            Some("assistant> Checking.\n  tool call get_weather({\"location\":\"Paris\"})")
        );
    }

    #[test]
    fn test_tool_result_and_hidden_roles() {
        let result = Message::tool("The weather for Paris is 70 degrees.", "call_1");
        assert_eq!(
            plain(render_message(&result, Color::Cyan)).as_deref(),
            Some("  [call_1] The weather for Paris is 70 degrees.")
        );
        assert_eq!(render_message(&Message::user("hi"), Color::Cyan), None);
        assert_eq!(render_message(&Message::assistant("", Vec::new()), Color::Cyan), None);
    }
}
