//! Shared test helpers: stub agents, a counting factory and a recording display.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use askweb::agent::{Agent, AgentConfig, AgentFactory, AgentInput, AgentOutput};
use askweb::controller::ChatDisplay;
use askweb::error::AskwebError;
use askweb::history::Turn;
use askweb::prompt::PromptValue;

/// Agent that answers with a fixed raw result and counts its calls.
pub struct StubAgent {
    output: Value,
    calls: AtomicUsize,
    inputs: Mutex<Vec<AgentInput>>,
}

impl StubAgent {
    pub fn new(output: Value) -> Self {
        Self {
            output,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of history messages passed in the last call.
    pub fn last_history_len(&self, slot: &str) -> usize {
        let inputs = self.inputs.lock().unwrap();
        match inputs.last().and_then(|input| input.variables.get(slot)) {
            Some(PromptValue::Messages(messages)) => messages.len(),
            _ => 0,
        }
    }
}

#[async_trait]
impl Agent for StubAgent {
    async fn invoke(&self, input: AgentInput) -> Result<AgentOutput, AskwebError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(input);
        Ok(AgentOutput::new(self.output.clone()))
    }
}

/// Agent whose every call fails with a rate-limit error.
#[derive(Default)]
pub struct FailingAgent {
    calls: AtomicUsize,
}

impl FailingAgent {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for FailingAgent {
    async fn invoke(&self, _input: AgentInput) -> Result<AgentOutput, AskwebError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AskwebError::RateLimited {
            retry_after_ms: Some(1000),
        })
    }
}

/// Agent that sleeps before answering.
pub struct SlowAgent {
    pub delay: Duration,
}

#[async_trait]
impl Agent for SlowAgent {
    async fn invoke(&self, _input: AgentInput) -> Result<AgentOutput, AskwebError> {
        tokio::time::sleep(self.delay).await;
        Ok(AgentOutput::new(Value::String("late".into())))
    }
}

/// Factory that hands out one shared agent and counts builds.
pub struct StubFactory {
    agent: Arc<dyn Agent>,
    builds: AtomicUsize,
}

impl StubFactory {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self {
            agent,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl AgentFactory for StubFactory {
    fn build(&self, _config: &AgentConfig) -> Result<Arc<dyn Agent>, AskwebError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(self.agent.clone())
    }
}

/// Config that never touches the process environment.
pub fn test_config(credential: &str) -> AgentConfig {
    AgentConfig::new(credential).with_credential_env_var(None)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    Turn(String, String),
    Error(String),
    Configure(String),
}

/// Display that records what it was asked to show.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    pub events: Arc<Mutex<Vec<DisplayEvent>>>,
}

impl RecordingDisplay {
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ChatDisplay for RecordingDisplay {
    fn show_turn(&mut self, turn: &Turn) {
        self.events
            .lock()
            .unwrap()
            .push(DisplayEvent::Turn(turn.role().to_string(), turn.text().to_string()));
    }

    fn show_error(&mut self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(DisplayEvent::Error(message.to_string()));
    }

    fn request_configuration(&mut self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(DisplayEvent::Configure(message.to_string()));
    }
}
