//! askweb: a terminal chat agent that answers with Gemini and searches the
//! web with DuckDuckGo.
//!
//! The core is small. An [`invoker::AgentInvoker`] takes one user message,
//! obtains an agent for the configured credential, calls it with the
//! session's prior turns, flattens the agent's result into a string with
//! [`normalize::normalize`] and records the exchange in a
//! [`history::HistoryStore`]. A [`controller::ChatController`] drives that
//! per submitted line and reports to a display.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use askweb::agent::{AgentConfig, GeminiAgentFactory};
//! use askweb::history::InMemoryHistoryStore;
//! use askweb::invoker::AgentInvoker;
//!
//! # async fn example() -> Result<(), askweb::error::InvokeError> {
//! let invoker = AgentInvoker::new(
//!     Arc::new(InMemoryHistoryStore::new()),
//!     Arc::new(GeminiAgentFactory::new()),
//! );
//! let config = AgentConfig::new(std::env::var("GOOGLE_API_KEY").unwrap_or_default());
//! let answer = invoker.invoke("demo", "What's new in Rust?", &config).await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod invoker;
pub mod models;
pub mod normalize;
pub mod prelude;
pub mod prompt;
pub mod provider;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
