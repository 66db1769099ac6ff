pub mod frontend;
pub mod registry;
pub mod types;
pub mod weather;

pub use frontend::{FrontendToolSpec, Parameter};
pub use registry::ToolRegistry;
pub use types::*;
pub use weather::WeatherTool;

/// Looks up a backend tool by the name used in agent configuration
pub fn builtin_tool(name: &str) -> Option<Box<dyn Tool>> {
    match name {
        weather::NAME => Some(Box::new(WeatherTool)),
        _ => None,
    }
}
