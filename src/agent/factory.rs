//! Agent construction.

use std::sync::Arc;

use tracing::debug;

use super::{Agent, AgentConfig, ToolCallingAgent};
use crate::error::AskwebError;
use crate::models::GoogleModel;
use crate::provider::google::GoogleProvider;

/// Builds an agent from a configuration. Building must not call out.
pub trait AgentFactory: Send + Sync {
    fn build(&self, config: &AgentConfig) -> Result<Arc<dyn Agent>, AskwebError>;
}

/// Gemini-backed [`ToolCallingAgent`] factory.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiAgentFactory;

impl GeminiAgentFactory {
    pub fn new() -> Self {
        Self
    }
}

impl AgentFactory for GeminiAgentFactory {
    fn build(&self, config: &AgentConfig) -> Result<Arc<dyn Agent>, AskwebError> {
        let model_id = config.model.trim();
        if model_id.is_empty() {
            return Err(AskwebError::Configuration("model must not be empty".into()));
        }
        let model: GoogleModel = model_id
            .parse()
            .map_err(|e| AskwebError::Configuration(format!("invalid model '{model_id}': {e}")))?;

        let mut provider = GoogleProvider::new(model, config.credential.trim().to_string());
        if let Some(base_url) = &config.base_url {
            provider = provider.with_base_url(base_url.clone());
        }
        debug!(model = model_id, tools = config.tools.len(), "Building agent");

        let agent = ToolCallingAgent::new(
            Arc::new(provider),
            config.tools.clone(),
            config.prompt.clone(),
            config.scratchpad_slot.clone(),
        )
        .with_settings(config.settings.clone())
        .with_max_iterations(config.max_iterations)
        .with_verbose(config.verbose);

        Ok(Arc::new(agent))
    }
}
