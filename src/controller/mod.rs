//! Chat session controller.
//!
//! Drives one request/response cycle per submitted line and reports the
//! result to a [`ChatDisplay`].

use std::sync::Arc;

use tracing::debug;

use crate::agent::AgentConfig;
use crate::error::InvokeError;
use crate::history::Turn;
use crate::invoker::AgentInvoker;

/// Rendering surface for a chat session.
pub trait ChatDisplay: Send {
    fn show_turn(&mut self, turn: &Turn);

    /// Show a failure the user should know about.
    fn show_error(&mut self, message: &str);

    /// Ask the user to supply missing configuration (usually an API key).
    fn request_configuration(&mut self, message: &str);
}

/// What happened to one submitted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The agent answered; both turns are in history.
    Replied(String),
    /// Configuration is missing. The input is kept for [`ChatController::resume`].
    NeedsConfiguration(String),
    /// The agent call failed; history is unchanged.
    Failed(String),
    /// Blank input.
    Ignored,
}

pub struct ChatController {
    session_key: String,
    config: AgentConfig,
    invoker: Arc<AgentInvoker>,
    display: Box<dyn ChatDisplay>,
    pending_input: Option<String>,
}

impl ChatController {
    pub fn new(
        session_key: impl Into<String>,
        config: AgentConfig,
        invoker: Arc<AgentInvoker>,
        display: Box<dyn ChatDisplay>,
    ) -> Self {
        Self {
            session_key: session_key.into(),
            config,
            invoker,
            display,
            pending_input: None,
        }
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Input held back by a configuration failure.
    pub fn pending_input(&self) -> Option<&str> {
        self.pending_input.as_deref()
    }

    pub fn history(&self) -> Vec<Turn> {
        self.invoker.history().list(&self.session_key)
    }

    /// Show every prior turn of this session.
    pub fn render_history(&mut self) {
        for turn in self.history() {
            self.display.show_turn(&turn);
        }
    }

    pub fn set_credential(&mut self, credential: impl Into<String>) {
        self.config.credential = credential.into();
    }

    /// Retry the input held back by a configuration failure.
    pub async fn resume(&mut self) -> ChatOutcome {
        match self.pending_input.take() {
            Some(text) => self.submit(&text).await,
            None => ChatOutcome::Ignored,
        }
    }

    pub async fn submit(&mut self, text: &str) -> ChatOutcome {
        let text = text.trim();
        if text.is_empty() {
            return ChatOutcome::Ignored;
        }

        match self
            .invoker
            .invoke(&self.session_key, text, &self.config)
            .await
        {
            Ok(reply) => {
                self.pending_input = None;
                self.display.show_turn(&Turn::user(text));
                self.display.show_turn(&Turn::assistant(reply.clone()));
                ChatOutcome::Replied(reply)
            }
            Err(InvokeError::Configuration(message)) => {
                debug!(session = %self.session_key, "Holding input until configured");
                self.pending_input = Some(text.to_string());
                self.display.request_configuration(&message);
                ChatOutcome::NeedsConfiguration(message)
            }
            Err(InvokeError::Upstream(err)) => {
                let message = format!("{err}. {}", err.recovery_suggestion().hint());
                self.display.show_error(&message);
                ChatOutcome::Failed(message)
            }
        }
    }
}

impl std::fmt::Debug for ChatController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatController")
            .field("session_key", &self.session_key)
            .field("config", &self.config)
            .field("pending_input", &self.pending_input)
            .finish_non_exhaustive()
    }
}
