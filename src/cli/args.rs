use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Agent to talk to, defaults to the configured default agent
    #[arg(short, long)]
    pub agent: Option<String>,

    /// List the configured agents and exit
    #[arg(long)]
    pub list_agents: bool,

    /// Override the agent's streaming setting
    #[arg(long)]
    pub stream: Option<bool>,

    /// Maximum number of model invocations per turn
    #[arg(long)]
    pub max_steps: Option<u32>,

    /// Your message; starts an interactive chat when omitted
    #[arg()]
    pub query: Vec<String>,

    /// Enable debug output
    #[arg(short, long, default_value = "false")]
    pub debug: bool,
}
