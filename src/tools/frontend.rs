use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::types::ToolDefinition;

/// A tool advertised by the chat UI. The agent only forwards the call;
/// the UI runs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendToolSpec {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_type() -> String {
    String::from("string")
}

const fn default_required() -> bool {
    true
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: Some(description.into()),
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert(String::from("type"), Value::String(self.kind.clone()));
        if let Some(description) = &self.description {
            schema.insert(String::from("description"), Value::String(description.clone()));
        }
        Value::Object(schema)
    }
}

impl From<&FrontendToolSpec> for ToolDefinition {
    fn from(spec: &FrontendToolSpec) -> Self {
        let properties: Map<String, Value> = spec
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.schema()))
            .collect();
        let required: Vec<&str> = spec
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}
