use crate::core::LLMError;
use crate::tools;
use log::info;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

include!(concat!(env!("OUT_DIR"), "/agents_embedded.rs"));

/// Optional per-directory override, resolved as `agents.{toml,json,yaml,...}`
const LOCAL_CONFIG: &str = "agents";
const ENV_PREFIX: &str = "CHAT_AGENTS";
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub default_agent: String,
    pub max_steps: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub agents: BTreeMap<String, AgentConfig>,
}

/// Settings for a single named agent and the endpoint it talks to
#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub model: String,
    pub base_url: String,
    /// Env var that overrides `base_url` when set
    #[serde(default)]
    pub base_url_env: Option<String>,
    /// Env var holding the bearer token; no auth header is sent when absent
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub presence_penalty: Option<f32>,
    #[serde(default)]
    pub frequency_penalty: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub parallel_tool_calls: Option<bool>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub backend_tools: Vec<String>,
}

/// Connection details resolved from an `AgentConfig` and the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub api_key: Option<String>,
}

fn default_log_level() -> String {
    String::from("info")
}

fn env_value(key: &str) -> Option<String> {
    dotenv::var(key)
        .or_else(|_| std::env::var(key))
        .ok()
        .filter(|value| !value.trim().is_empty())
}

impl Config {
    /// Loads the embedded defaults, then `./agents.*` if present, then
    /// `CHAT_AGENTS_*` environment overrides.
    pub fn load() -> Result<Self, LLMError> {
        Self::layered(
            config::File::with_name(LOCAL_CONFIG).required(false),
            Self::environment(),
        )
    }

    /// Like [`Config::load`] but with an explicit override file.
    pub fn load_from(path: &Path) -> Result<Self, LLMError> {
        Self::layered(config::File::from(path), Self::environment())
    }

    /// The configuration shipped with the binary, without any overrides.
    pub fn embedded() -> Result<Self, LLMError> {
        config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()?
            .try_deserialize()
            .map_err(LLMError::from)
    }

    /// `CHAT_AGENTS_MAX_STEPS`, `CHAT_AGENTS_AGENTS__<NAME>__MODEL`, ...
    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn layered<S>(local: S, environment: config::Environment) -> Result<Self, LLMError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .add_source(local)
            .add_source(environment)
            .build()?
            .try_deserialize()
            .map_err(LLMError::from)
    }

    pub fn agent(&self, name: &str) -> Option<&AgentConfig> {
        self.agents.get(name)
    }

    pub fn agent_names(&self) -> Vec<String> {
        self.agents.keys().cloned().collect()
    }

    /// Returns every problem found; an empty list means the config is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_steps == 0 {
            errors.push(String::from("max_steps must be at least 1"));
        }

        if !self.agents.contains_key(&self.default_agent) {
            errors.push(format!(
                "default_agent \"{}\" is not declared under [agents]",
                self.default_agent
            ));
        }

        for (name, agent) in &self.agents {
            if agent.model.trim().is_empty() {
                errors.push(format!("agents.{name}.model must not be empty"));
            }
            if agent.base_url.trim().is_empty() {
                errors.push(format!("agents.{name}.base_url must not be empty"));
            }
            if !(0.0..=2.0).contains(&agent.temperature) {
                errors.push(format!("agents.{name}.temperature must be within 0..=2"));
            }
            for (field, penalty) in [
                ("presence_penalty", agent.presence_penalty),
                ("frequency_penalty", agent.frequency_penalty),
            ] {
                if penalty.is_some_and(|p| !(-2.0..=2.0).contains(&p)) {
                    errors.push(format!("agents.{name}.{field} must be within -2..=2"));
                }
            }
            for tool in &agent.backend_tools {
                if tools::builtin_tool(tool).is_none() {
                    errors.push(format!("agents.{name} binds unknown backend tool \"{tool}\""));
                }
            }
        }

        errors
    }

    /// Logs which agents are available and whether their credentials are present.
    pub fn log_summary(&self) {
        info!(
            "[Config] default agent: {}, max steps: {}, log level: {}",
            self.default_agent, self.max_steps, self.log_level
        );
        for (name, agent) in &self.agents {
            let key_state = match agent.api_key_env.as_deref() {
                Some(var) if env_value(var).is_some() => "configured",
                Some(_) => "missing",
                None => "not required",
            };
            info!(
                "[Config] agent {name}: model {}, streaming {}, api key {key_state}",
                agent.model, agent.stream
            );
        }
    }
}

impl AgentConfig {
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Resolves base URL and API key, preferring values from the environment.
    pub fn endpoint(&self) -> Result<Endpoint, LLMError> {
        let base_url = self
            .base_url_env
            .as_deref()
            .and_then(env_value)
            .unwrap_or_else(|| self.base_url.clone());

        let api_key = match self.api_key_env.as_deref() {
            Some(var) => Some(env_value(var).ok_or_else(|| {
                LLMError::ConfigError(format!("{var} not set in .env or environment"))
            })?),
            None => None,
        };

        Ok(Endpoint {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn agent() -> AgentConfig {
        AgentConfig {
            model: String::from("deepseek-chat"),
            base_url: String::from("https://api.example.com/v1/"),
            base_url_env: None,
            api_key_env: None,
            system_prompt: None,
            temperature: 0.0,
            presence_penalty: Some(0.5),
            frequency_penalty: Some(0.5),
            max_tokens: None,
            parallel_tool_calls: None,
            stream: false,
            backend_tools: Vec::new(),
        }
    }

    #[test]
    fn test_embedded_config_is_valid() {
        let config = Config::embedded().expect("embedded config should parse");
        assert_eq!(config.max_steps, 25);
        assert_eq!(
            config.agent_names(),
            vec![
                String::from("generative_ui_backend_tools"),
                String::from("generative_ui_frontend_tools"),
            ]
        );
        let errors = config.validate();
        assert!(errors.is_empty(), "unexpected validation errors: {errors:?}");

        let backend = config
            .agent("generative_ui_backend_tools")
            .expect("backend agent should exist");
        assert_eq!(backend.backend_tools, vec![String::from("get_weather")]);
        assert_eq!(backend.parallel_tool_calls, Some(false));
    }

    #[test]
    fn test_override_file_adds_agent() {
        let mut file = Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            r#"
default_agent = "local"
max_steps = 3

[agents.local]
model = "llama3"
base_url = "http://localhost:11434/v1"
"#
        )
        .expect("write config");

        let config = Config::load_from(file.path()).expect("override should load");
        assert_eq!(config.default_agent, "local");
        assert_eq!(config.max_steps, 3);
        assert!(config.agent("generative_ui_backend_tools").is_some());

        let local = config.agent("local").expect("local agent");
        assert_eq!(local.system_prompt(), DEFAULT_SYSTEM_PROMPT);
        assert!(!local.stream);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_environment_overrides_nested_keys() {
        let variables = config::Map::from([
            (String::from("CHAT_AGENTS_MAX_STEPS"), String::from("7")),
            (
                String::from("CHAT_AGENTS_AGENTS__GENERATIVE_UI_BACKEND_TOOLS__MODEL"),
                String::from("deepseek-reasoner"),
            ),
            (String::from("UNRELATED_MAX_STEPS"), String::from("99")),
        ]);
        let no_file = config::File::from_str("", config::FileFormat::Toml);

        let config = Config::layered(no_file, Config::environment().source(Some(variables)))
            .expect("env overrides should load");
        assert_eq!(config.max_steps, 7);
        assert_eq!(
            config
                .agent("generative_ui_backend_tools")
                .map(|agent| agent.model.as_str()),
            Some("deepseek-reasoner")
        );
        assert_eq!(
            config
                .agent("generative_ui_frontend_tools")
                .map(|agent| agent.model.as_str()),
            Some("qwen-plus-0428")
        );
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut bad = agent();
        bad.model = String::new();
        bad.temperature = 3.5;
        bad.frequency_penalty = Some(-4.0);
        bad.backend_tools = vec![String::from("launch_rockets")];

        let config = Config {
            default_agent: String::from("nobody"),
            max_steps: 0,
            log_level: default_log_level(),
            agents: BTreeMap::from([(String::from("bad"), bad)]),
        };

        let errors = config.validate();
        assert_eq!(errors.len(), 6, "got: {errors:?}");
        assert!(errors.iter().any(|e| e.contains("max_steps")));
        assert!(errors.iter().any(|e| e.contains("default_agent \"nobody\"")));
        assert!(errors.iter().any(|e| e.contains("agents.bad.model")));
        assert!(errors.iter().any(|e| e.contains("temperature")));
        assert!(errors.iter().any(|e| e.contains("frequency_penalty")));
        assert!(errors.iter().any(|e| e.contains("launch_rockets")));
    }

    #[test]
    fn test_endpoint_without_key_env_trims_base_url() {
        let endpoint = agent().endpoint().expect("endpoint should resolve");
        assert_eq!(endpoint.base_url, "https://api.example.com/v1");
        assert_eq!(endpoint.api_key, None);
    }

    #[test]
    fn test_endpoint_reports_missing_key() {
        let mut config = agent();
        config.api_key_env = Some(String::from("CHAT_AGENTS_TEST_KEY_THAT_IS_NEVER_SET"));
        match config.endpoint() {
            Err(LLMError::ConfigError(msg)) => {
                assert!(msg.contains("CHAT_AGENTS_TEST_KEY_THAT_IS_NEVER_SET"));
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }
}
