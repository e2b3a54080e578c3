//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for gaia
#[derive(Parser, Debug)]
#[command(name = "gaia")]
#[command(author, version, about = "Ask local or hosted LLMs from the terminal")]
#[command(long_about = r#"
gaia sends prompts to an Ollama server (or the OpenAI / Mistral APIs) and
prints the reply. A role, i.e. a system prompt such as "shell" or "code",
is picked from the message automatically unless --role is given.

Configuration files are loaded from (lowest to highest priority):
1. ~/.config/gaia/config.toml   Global config
2. ./gaia.toml or ./.gaia.toml  Project-level config
3. --config <path> or $GAIA_CONFIG
4. GAIA_* environment variables (GAIA_PROVIDER__MODEL=llama3)

Example:
  gaia "how do I list open ports"
  git diff | gaia ask "review this change"
  gaia investigate "why is the disk full?"
  gaia tool git commit
"#)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Prompt to ask without a subcommand (same as `gaia ask`)
    #[command(flatten)]
    pub ask: AskArgs,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Model to use (overrides provider.model)
    #[arg(short, long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Provider host (overrides provider.host)
    #[arg(long, global = true, value_name = "HOST")]
    pub host: Option<String>,

    /// Provider port (overrides provider.port)
    #[arg(long, global = true, value_name = "PORT")]
    pub port: Option<u16>,

    /// Bypass the local response cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Regenerate and overwrite cache entries
    #[arg(long, global = true)]
    pub refresh_cache: bool,

    /// Show role detection and operator decisions
    #[arg(long, global = true)]
    pub debug: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The subcommand to run; a bare prompt means `ask`.
    pub fn resolved_command(&self) -> Option<Command> {
        match &self.command {
            Some(command) => Some(command.clone()),
            None if !self.ask.prompt.is_empty() => Some(Command::Ask(self.ask.clone())),
            None => None,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask a model (piped stdin is prepended to the prompt)
    Ask(AskArgs),

    /// Start an interactive chat session
    Chat(ChatArgs),

    /// Investigate a goal by running shell commands and reasoning
    #[command(long_about = "Run the operator to investigate a goal. The model may run \
        shell commands (e.g. df, du) subject to safety checks. Use --dry-run to see \
        what would be run without executing.")]
    Investigate(InvestigateArgs),

    /// Run a configured tool action (e.g. `gaia tool git commit`)
    Tool(ToolCommandArgs),

    /// Inspect or clear the response cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Read or change configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print version information
    Version,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct AskArgs {
    /// Prompt words, joined with spaces
    #[arg(value_name = "PROMPT")]
    pub prompt: Vec<String>,

    /// Role to use instead of detecting one (default, describe, shell, code, ...)
    #[arg(short, long, value_name = "ROLE")]
    pub role: Option<String>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Role for every message instead of detecting one
    #[arg(short, long, value_name = "ROLE")]
    pub role: Option<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct InvestigateArgs {
    /// What to find out
    #[arg(required = true, value_name = "GOAL")]
    pub goal: Vec<String>,

    /// Maximum number of operator steps (default: operator.max_steps)
    #[arg(short = 'n', long, value_name = "N")]
    pub max_steps: Option<usize>,

    /// Do not execute commands; only show what would be run
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation for medium-risk commands
    #[arg(short, long)]
    pub yes: bool,
}

impl InvestigateArgs {
    pub fn goal_text(&self) -> String {
        self.goal.join(" ")
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ToolCommandArgs {
    /// Tool name, e.g. git
    pub tool: String,

    /// Action name, e.g. commit
    pub action: String,

    /// Extra description passed to the model
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CacheCommand {
    /// Show entry count and total size
    Stats,
    /// List entries, newest first
    List,
    /// Remove all entries
    Clear,
    /// Print every entry with its response
    Dump,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the effective configuration
    List,
    /// Print one value
    Get { key: String },
    /// Set a value in the configuration file
    Set { key: String, value: String },
    /// Print the configuration file path
    Path,
    /// Create the configuration file with defaults if it does not exist
    Create,
}
