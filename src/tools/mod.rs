//! Tool system for function calling.

pub mod arguments;
pub mod search;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use search::{DuckDuckGoSearch, SearchSettings};
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use types::AgentToolParameters;
