pub mod args;
pub mod frontend_tools;
pub mod render;
pub mod run;

pub use args::Args;
pub use frontend_tools::FrontendTools;
pub use run::{run, ChatSession};
