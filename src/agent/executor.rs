//! Tool-calling agent: prompt → model → tools → model … → answer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{Agent, AgentInput, AgentOutput, AgentStep};
use crate::error::AskwebError;
use crate::prompt::{PromptTemplate, PromptVariables};
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::tools::{Tool, ToolArguments, ToolExecutionContext};
use crate::types::*;

/// Answer returned when the model keeps calling tools past the iteration limit.
pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit or time limit.";

pub struct ToolCallingAgent {
    provider: Arc<dyn ModelProvider>,
    tools: Vec<Arc<dyn Tool>>,
    prompt: PromptTemplate,
    scratchpad_slot: String,
    settings: GenerationSettings,
    max_iterations: usize,
    verbose: bool,
}

impl ToolCallingAgent {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        tools: Vec<Arc<dyn Tool>>,
        prompt: PromptTemplate,
        scratchpad_slot: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            prompt,
            scratchpad_slot: scratchpad_slot.into(),
            settings: GenerationSettings::default(),
            max_iterations: super::config::DEFAULT_MAX_ITERATIONS,
            verbose: false,
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn tool_definitions(&self) -> Option<Vec<ToolDefinition>> {
        if self.tools.is_empty() {
            None
        } else {
            Some(self.tools.iter().map(|t| t.definition()).collect())
        }
    }

    async fn run_tool(&self, call: &AgentToolCall, ctx: &ToolExecutionContext) -> AgentToolResult {
        if self.verbose {
            info!(tool = %call.name, arguments = %call.arguments, "Invoking tool");
        }

        let outcome = match self.tools.iter().find(|t| t.name() == call.name) {
            Some(tool) => tool
                .execute(&ToolArguments::new(call.arguments.clone()), ctx)
                .await,
            None => Err(AskwebError::ToolExecution {
                tool_name: call.name.clone(),
                message: format!("Tool '{}' not found", call.name),
            }),
        };

        match outcome {
            Ok(value) => AgentToolResult {
                tool_call_id: call.id.clone(),
                tool_name: call.name.clone(),
                result: value,
                is_error: false,
            },
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                AgentToolResult {
                    tool_call_id: call.id.clone(),
                    tool_name: call.name.clone(),
                    result: serde_json::json!({ "error": e.to_string() }),
                    is_error: true,
                }
            }
        }
    }
}

#[async_trait]
impl Agent for ToolCallingAgent {
    async fn invoke(&self, input: AgentInput) -> Result<AgentOutput, AskwebError> {
        let tool_defs = self.tool_definitions();
        let ctx = ToolExecutionContext {
            session_key: Some(input.session_key.clone()),
        };

        let mut scratchpad: Vec<ModelMessage> = Vec::new();
        let mut steps = Vec::new();
        let mut total_usage = Usage::default();

        for iteration in 0..self.max_iterations {
            let variables: PromptVariables = input
                .variables
                .clone()
                .messages(self.scratchpad_slot.clone(), scratchpad.clone());
            let request = ProviderRequest {
                messages: self.prompt.render(&variables)?,
                settings: self.settings.clone(),
                tools: tool_defs.clone(),
            };

            debug!(iteration, provider = self.provider.provider_name(), "Calling model");
            let response = self.provider.generate_text(&request).await?;
            total_usage.merge(&response.usage);

            if response.tool_calls.is_empty() {
                let output = serde_json::to_value(&response.content)?;
                return Ok(AgentOutput {
                    output,
                    steps,
                    usage: total_usage,
                });
            }

            let mut assistant_content = response.content.clone();
            assistant_content.extend(response.tool_calls.iter().cloned().map(ContentPart::ToolCall));
            scratchpad.push(ModelMessage::assistant_parts(assistant_content));

            for call in &response.tool_calls {
                let result = self.run_tool(call, &ctx).await;
                scratchpad.push(ModelMessage::tool_result(result.clone()));
                steps.push(AgentStep {
                    call: call.clone(),
                    result,
                });
            }
        }

        warn!(max_iterations = self.max_iterations, "Agent hit iteration limit");
        Ok(AgentOutput {
            output: serde_json::Value::String(ITERATION_LIMIT_MESSAGE.to_string()),
            steps,
            usage: total_usage,
        })
    }
}
