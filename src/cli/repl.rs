//! Terminal chat loop.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::controller::{ChatController, ChatDisplay};
use crate::error::AskwebError;
use crate::history::{Turn, TurnRole};

/// Prints turns to stdout and problems to stderr.
#[derive(Debug, Default)]
pub struct TerminalDisplay;

impl ChatDisplay for TerminalDisplay {
    fn show_turn(&mut self, turn: &Turn) {
        match turn.role() {
            // The user already sees what they typed.
            TurnRole::User => {}
            TurnRole::Assistant => println!("{}\n", turn.text()),
        }
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("❌ {message}");
    }

    fn request_configuration(&mut self, message: &str) {
        eprintln!("🔑 {message}");
        eprintln!("   Enter /key <your-google-api-key> to continue.");
    }
}

/// Prints every turn, labelled by role. Used for `/history`.
#[derive(Debug, Default)]
pub struct TranscriptDisplay;

impl ChatDisplay for TranscriptDisplay {
    fn show_turn(&mut self, turn: &Turn) {
        println!("[{}] {}", turn.role(), turn.text());
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("❌ {message}");
    }

    fn request_configuration(&mut self, message: &str) {
        eprintln!("🔑 {message}");
    }
}

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Message(String),
    History,
    Key(String),
    Quit,
    Help,
    Empty,
    Unknown(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let (name, rest) = command
            .split_once(char::is_whitespace)
            .map(|(n, r)| (n, r.trim()))
            .unwrap_or((command, ""));
        match name {
            "quit" | "exit" => Self::Quit,
            "history" => Self::History,
            "help" => Self::Help,
            "key" if !rest.is_empty() => Self::Key(rest.to_string()),
            _ => Self::Unknown(line.to_string()),
        }
    }
}

const HELP: &str = "Commands: /history, /key <api-key>, /help, /quit";

/// Read lines from stdin until EOF or `/quit`.
pub async fn run_repl(
    controller: &mut ChatController,
    transcript: &mut dyn ChatDisplay,
) -> Result<(), AskwebError> {
    println!("askweb chat (session {}). {HELP}", controller.session_key());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::History => {
                for turn in controller.history() {
                    transcript.show_turn(&turn);
                }
            }
            ReplCommand::Key(key) => {
                controller.set_credential(key);
                if controller.pending_input().is_some() {
                    controller.resume().await;
                } else {
                    println!("API key set.");
                }
            }
            ReplCommand::Unknown(text) => eprintln!("Unknown command: {text}. {HELP}"),
            ReplCommand::Message(text) => {
                controller.submit(&text).await;
            }
        }
    }
    Ok(())
}
