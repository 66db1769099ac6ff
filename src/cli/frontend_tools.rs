use colored::Color;
use serde_json::{json, Value};

use crate::tools::{FrontendToolSpec, Parameter, ToolCall, ToolDefinition};

const CHANGE_BACKGROUND: &str = "change_background";

/// Tools the terminal UI advertises to agents and runs itself
pub struct FrontendTools {
    accent: Color,
    background: Option<String>,
}

impl Default for FrontendTools {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            background: None,
        }
    }
}

impl FrontendTools {
    pub fn specs() -> Vec<FrontendToolSpec> {
        vec![FrontendToolSpec {
            name: CHANGE_BACKGROUND.to_string(),
            description: "Change the background color of the chat. Can be anything that the \
                          CSS background attribute accepts."
                .to_string(),
            parameters: vec![Parameter::new(
                "background",
                "string",
                "The background. Prefer gradients.",
            )],
        }]
    }

    pub fn definitions() -> Vec<ToolDefinition> {
        Self::specs().iter().map(ToolDefinition::from).collect()
    }

    /// Colour used for assistant output
    pub const fn accent(&self) -> Color {
        self.accent
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    /// Runs a delegated call and returns a `{status, message}` payload.
    pub fn handle(&mut self, call: &ToolCall) -> Value {
        match call.name.as_str() {
            CHANGE_BACKGROUND => {
                let Some(background) = call.arguments.get("background").and_then(Value::as_str)
                else {
                    return json!({
                        "status": "error",
                        "message": "background must be a string",
                    });
                };
                // Terminal colours only; gradients are remembered but not drawn
                if let Ok(color) = background.parse::<Color>() {
                    self.accent = color;
                }
                self.background = Some(background.to_string());
                json!({
                    "status": "success",
                    "message": format!("Background changed to {background}"),
                })
            }
            other => json!({
                "status": "error",
                "message": format!("Tool {other} is not available in this chat"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolArguments;

    fn call(name: &str, arguments: Value) -> ToolCall {
        let Value::Object(arguments) = arguments else {
            panic!("arguments must be an object");
        };
        ToolCall::new("call_1", name, arguments)
    }

    #[test]
    fn test_named_colour_changes_accent() {
        let mut tools = FrontendTools::default();
        let result = tools.handle(&call(CHANGE_BACKGROUND, json!({"background": "magenta"})));

        assert_eq!(result["status"], "success");
        assert_eq!(result["message"], "Background changed to magenta");
        assert_eq!(tools.accent(), Color::Magenta);
        assert_eq!(tools.background(), Some("magenta"));
    }

    #[test]
    fn test_gradient_keeps_accent() {
        let mut tools = FrontendTools::default();
        let gradient = "linear-gradient(90deg, #ff7e5f, #feb47b)";
        let result = tools.handle(&call(CHANGE_BACKGROUND, json!({"background": gradient})));

        assert_eq!(result["status"], "success");
        assert_eq!(tools.accent(), Color::Cyan);
        assert_eq!(tools.background(), Some(gradient));
    }

    #[test]
    fn test_missing_argument_and_unknown_tool_report_errors() {
        let mut tools = FrontendTools::default();
        let missing = tools.handle(&ToolCall::new("call_2", CHANGE_BACKGROUND, ToolArguments::new()));
        assert_eq!(missing["status"], "error");

        let unknown = tools.handle(&call("launch_rockets", json!({})));
        assert_eq!(unknown["message"], "Tool launch_rockets is not available in this chat");
    }

    #[test]
    fn test_definitions_advertise_change_background() {
        let definitions = FrontendTools::definitions();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].name, CHANGE_BACKGROUND);
        assert_eq!(definitions[0].parameters["required"], json!(["background"]));
    }
}
