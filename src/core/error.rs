#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    /// Network-related errors
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    /// Response parsing errors (missing fields, invalid format)
    #[error("Failed to parse response: {0}")]
    ResponseFormat(String),
    /// API-specific errors (invalid request, unexpected status)
    #[error("API error: {0}")]
    ApiError(String),
    /// Authentication-specific errors
    #[error("Authentication error: {0}")]
    Authentication(String),
    /// The provider throttled the request
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),
    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),
    /// Stream-related errors
    #[error("Stream error: {0}")]
    StreamError(String),
    /// Tool execution errors
    #[error("Tool error: {0}")]
    ToolError(ToolError),
    /// I/O error
    #[error("I/O error: {0}")]
    IOError(String),
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// No agent registered under the requested name
    #[error("Agent \"{name}\" not found, available agents: {}", available.join(", "))]
    AgentNotFound {
        name: String,
        available: Vec<String>,
    },
    /// The agent kept requesting backend tools past its step budget
    #[error("Recursion limit of {0} steps reached without a final answer")]
    RecursionLimit(u32),
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool not found error
    #[error("Tool not found: {0}")]
    ToolNotFound(String),
    /// Tool execution error
    #[error("Tool execution failed: {0}")]
    ExecutionError(String),
    /// Invalid argument error
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<ToolError> for LLMError {
    fn from(err: ToolError) -> Self {
        Self::ToolError(err)
    }
}

impl From<std::io::Error> for LLMError {
    fn from(err: std::io::Error) -> Self {
        Self::IOError(err.to_string())
    }
}

impl From<config::ConfigError> for LLMError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        // If the error has a status code, map it to a more specific error
        if let Some(status) = err.status() {
            match status.as_u16() {
                401 | 403 => Self::Authentication(format!("Authentication failed: {err}")),
                429 => Self::RateLimited(err.to_string()),
                500..=599 => Self::ServerError(err.to_string()),
                _ => Self::Network(err),
            }
        } else {
            Self::Network(err)
        }
    }
}
