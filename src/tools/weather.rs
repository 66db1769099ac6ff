use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::error::ToolError;
use crate::tools::types::{Tool, ToolArguments, ToolDefinition};

pub const NAME: &str = "get_weather";

const LOCATION_STRING_ERROR: &str = "location must be a string";
const LOCATION_EMPTY_ERROR: &str = "location cannot be empty";

/// Canned weather report, enough to exercise a backend tool round trip
pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_string(),
            description: "Get the weather for a given location.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The location to get weather for"
                    }
                },
                "required": ["location"]
            }),
        }
    }

    async fn execute(&self, arguments: &ToolArguments) -> Result<Value, ToolError> {
        let location = arguments
            .get("location")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArgument(String::from(LOCATION_STRING_ERROR)))?
            .trim();

        if location.is_empty() {
            return Err(ToolError::InvalidArgument(String::from(
                LOCATION_EMPTY_ERROR,
            )));
        }

        Ok(json!(format!("The weather for {location} is 70 degrees.")))
    }
}
