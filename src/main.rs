//! askweb CLI binary entry point.

use std::sync::Arc;

use askweb::agent::GeminiAgentFactory;
use askweb::cli::repl::{run_repl, TerminalDisplay, TranscriptDisplay};
use askweb::cli::{Cli, Commands};
use askweb::config::AskwebConfig;
use askweb::controller::{ChatController, ChatOutcome};
use askweb::history::InMemoryHistoryStore;
use askweb::invoker::AgentInvoker;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.common().verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "askweb=debug" } else { "askweb=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let common = cli.common().clone();
    let config = AskwebConfig::load(common.config.as_deref(), common.overrides())?;
    tracing::debug!(?config, "Resolved configuration");

    let session_key = config
        .session
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let invoker = Arc::new(AgentInvoker::new(
        Arc::new(InMemoryHistoryStore::new()),
        Arc::new(GeminiAgentFactory::new()),
    ));
    let mut controller = ChatController::new(
        session_key,
        config.agent_config(),
        invoker,
        Box::new(TerminalDisplay),
    );

    match cli.command {
        Commands::Chat(_) => run_repl(&mut controller, &mut TranscriptDisplay).await?,
        Commands::Ask(args) => match controller.submit(&args.prompt).await {
            ChatOutcome::Replied(_) | ChatOutcome::Ignored => {}
            ChatOutcome::NeedsConfiguration(message) | ChatOutcome::Failed(message) => {
                return Err(message.into());
            }
        },
    }
    Ok(())
}
