//! CLI entry point for askweb.

pub mod repl;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ConfigOverrides;

/// askweb: chat with Gemini, backed by DuckDuckGo search
#[derive(Parser, Debug)]
#[command(name = "askweb", version, about = "askweb: web-searching chat agent")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat session
    Chat(ChatArgs),
    /// Ask a single question and print the answer
    Ask(AskArgs),
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Gemini model id (e.g. gemini-2.5-flash)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Session key; a random one is used if omitted
    #[arg(long)]
    pub session: Option<String>,

    /// Google API key (otherwise GOOGLE_API_KEY or the config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Seconds to wait for an answer
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Config file (default: ~/.askweb/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log tool calls and debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            session: self.session.clone(),
            timeout_secs: self.timeout,
            verbose: self.verbose,
        }
    }
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the `ask` subcommand.
#[derive(Parser, Debug)]
pub struct AskArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// The question
    pub prompt: String,
}

impl Cli {
    pub fn common(&self) -> &CommonArgs {
        match &self.command {
            Commands::Chat(args) => &args.common,
            Commands::Ask(args) => &args.common,
        }
    }
}
