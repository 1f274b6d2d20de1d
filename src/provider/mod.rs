//! Model provider trait and the Gemini implementation.

pub mod google;
pub mod http;

use async_trait::async_trait;

use crate::error::AskwebError;
use crate::types::{
    message::{AgentToolCall, ContentPart},
    FinishReason, GenerationSettings, ModelMessage, Usage,
};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    /// Answer parts in the order the model produced them (text and thoughts).
    pub content: Vec<ContentPart>,
    pub tool_calls: Vec<AgentToolCall>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

impl ProviderResponse {
    /// Convenience constructor for a single text answer.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentPart::Text { text: text.into() }],
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }
    }

    /// Concatenated text parts.
    pub fn answer_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "google").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate one response (non-streaming).
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, AskwebError>;
}
