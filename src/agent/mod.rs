//! The agent boundary.
//!
//! An [`Agent`] is an opaque, invocable component: it receives the user's
//! input plus prior history and returns a raw result, calling tools on its own
//! as often as it sees fit. [`ToolCallingAgent`] is the built-in
//! implementation; agents are produced by an [`AgentFactory`] and shared
//! through an [`AgentCache`].

pub mod cache;
pub mod config;
pub mod executor;
pub mod factory;

pub use cache::AgentCache;
pub use config::AgentConfig;
pub use executor::ToolCallingAgent;
pub use factory::{AgentFactory, GeminiAgentFactory};

use async_trait::async_trait;

use crate::error::AskwebError;
use crate::normalize::RawAgentResult;
use crate::prompt::PromptVariables;
use crate::types::{AgentToolCall, AgentToolResult, Usage};

/// Input for one agent invocation.
#[derive(Debug, Clone)]
pub struct AgentInput {
    pub session_key: String,
    /// Current input and prior history, bound to the caller's slot names.
    pub variables: PromptVariables,
}

/// One tool call made while answering.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStep {
    pub call: AgentToolCall,
    pub result: AgentToolResult,
}

/// Result of one agent invocation.
#[derive(Debug, Clone)]
pub struct AgentOutput {
    pub output: RawAgentResult,
    pub steps: Vec<AgentStep>,
    pub usage: Usage,
}

impl AgentOutput {
    pub fn new(output: RawAgentResult) -> Self {
        Self {
            output,
            steps: Vec::new(),
            usage: Usage::default(),
        }
    }
}

/// An invocable agent. Implementations must tolerate concurrent calls.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn invoke(&self, input: AgentInput) -> Result<AgentOutput, AskwebError>;
}
