use log::debug;

use super::args::Args;
use super::frontend_tools::FrontendTools;
use super::render::render_message;
use crate::{
    core::{AgentRegistry, AgentState, ChatAgent, Config, LLMError},
    providers::Message,
};
use colored::Colorize;
use std::io::{self, BufRead, Write};

const EXIT_COMMANDS: [&str; 2] = ["exit", "quit"];

/// A running chat between the terminal user and one agent
pub struct ChatSession {
    agent: ChatAgent,
    frontend: FrontendTools,
    state: AgentState,
}

impl ChatSession {
    pub fn new(agent: ChatAgent, frontend: FrontendTools) -> Self {
        let state = AgentState {
            messages: Vec::new(),
            tools: FrontendTools::definitions(),
        };
        Self {
            agent,
            frontend,
            state,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.state.messages
    }

    pub const fn frontend(&self) -> &FrontendTools {
        &self.frontend
    }

    /// Sends one user message, prints what the agent produced and runs any
    /// calls it delegated to the UI.
    pub async fn send<W: Write>(&mut self, text: &str, writer: &mut W) -> Result<(), LLMError> {
        self.state.messages.push(Message::user(text));
        let outcome = match self.agent.run_turn(&self.state).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Unanswered messages are not kept
                self.state.messages.pop();
                return Err(e);
            }
        };
        debug!(
            "[Session] agent {} finished the turn in {} step(s)",
            self.agent.name(),
            outcome.steps
        );

        for message in &outcome.messages {
            if let Some(rendered) = render_message(message, self.frontend.accent()) {
                writeln!(writer, "{rendered}")?;
            }
        }
        self.state.messages.extend(outcome.messages);

        for call in &outcome.frontend_calls {
            let result = self.frontend.handle(call);
            let status = result["status"].as_str().unwrap_or("unknown");
            let message = result["message"].as_str().unwrap_or_default();
            writeln!(
                writer,
                "  {} {status}: {message}",
                format!("[frontend {}]", call.name).color(self.frontend.accent())
            )?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn init_logging(level: &str, debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // A second init (e.g. in tests) is harmless
    let _ = builder.try_init();
}

fn load_config(args: &Args) -> Result<(Config, String), LLMError> {
    let mut config = Config::load()?;

    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }
    let agent_name = args
        .agent
        .clone()
        .unwrap_or_else(|| config.default_agent.clone());
    if let (Some(stream), Some(agent)) = (args.stream, config.agents.get_mut(&agent_name)) {
        agent.stream = stream;
    }

    let problems = config.validate();
    if !problems.is_empty() {
        return Err(LLMError::ConfigError(format!(
            "invalid configuration:\n  - {}",
            problems.join("\n  - ")
        )));
    }

    Ok((config, agent_name))
}

pub async fn run(args: Args) -> Result<(), LLMError> {
    let _ = dotenv::dotenv();

    let (config, agent_name) = load_config(&args)?;
    init_logging(&config.log_level, args.debug);
    config.log_summary();

    debug!(
        "[SETTINGS] agent: {agent_name}, max_steps: {}",
        config.max_steps
    );

    let registry = AgentRegistry::new(config);
    let mut stdout = io::stdout();

    if args.list_agents {
        for name in registry.names() {
            let marker = if name == registry.default_name() { " (default)" } else { "" };
            writeln!(&mut stdout, "{name}{marker}")?;
        }
        return Ok(());
    }

    let agent = registry.agent(&agent_name)?;
    let mut session = ChatSession::new(agent, FrontendTools::default());

    if !args.query.is_empty() {
        return session.send(&args.query.join(" "), &mut stdout).await;
    }

    writeln!(
        &mut stdout,
        "{}",
        format!("Hi, I'm {agent_name}. Want to chat? (type \"exit\" to leave)").bold()
    )?;
    let stdin = io::stdin();
    loop {
        write!(&mut stdout, "{} ", "you>".bold())?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&line) {
            break;
        }

        // A failed turn should not end the chat
        if let Err(e) = session.send(line, &mut stdout).await {
            eprintln!("{} {e}", "error:".red().bold());
        }
    }

    Ok(())
}
