//! Convenience re-exports for common use.

pub use crate::agent::{Agent, AgentCache, AgentConfig, AgentFactory, GeminiAgentFactory};
pub use crate::config::AskwebConfig;
pub use crate::controller::{ChatController, ChatDisplay, ChatOutcome};
pub use crate::error::{AskwebError, InvokeError, Result};
pub use crate::history::{HistoryStore, InMemoryHistoryStore, Session, Turn, TurnRole};
pub use crate::invoker::AgentInvoker;
pub use crate::normalize::{normalize, RawAgentResult};
pub use crate::provider::ModelProvider;
pub use crate::tools::{AgentTool, AgentToolParameters, DuckDuckGoSearch, Tool, ToolArguments};
pub use crate::types::{ContentPart, GenerationSettings, ModelMessage, Role, Usage};
