//! Per-invocation agent configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::AskwebError;
use crate::prompt::{PromptTemplate, CHAT_HISTORY_SLOT, INPUT_SLOT, SCRATCHPAD_SLOT};
use crate::tools::{DuckDuckGoSearch, Tool};
use crate::types::GenerationSettings;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_CREDENTIAL_ENV: &str = "GOOGLE_API_KEY";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Everything needed to build and call an agent.
#[derive(Clone)]
pub struct AgentConfig {
    pub model: String,
    pub credential: String,
    /// Gemini endpoint override.
    pub base_url: Option<String>,
    pub tools: Vec<Arc<dyn Tool>>,
    pub prompt: PromptTemplate,
    /// Slot the current user input is bound to.
    pub input_slot: String,
    /// Slot prior turns are bound to.
    pub history_slot: String,
    /// Slot the agent fills with its own tool-calling messages.
    pub scratchpad_slot: String,
    /// Environment variable the credential is exported to before the agent is built.
    pub credential_env_var: Option<String>,
    pub settings: GenerationSettings,
    pub timeout: Duration,
    pub max_iterations: usize,
    /// Log every tool call at info level.
    pub verbose: bool,
}

impl AgentConfig {
    /// Default agent: Gemini Flash, one DuckDuckGo search tool, tool-calling prompt.
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            credential: credential.into(),
            base_url: None,
            tools: vec![Arc::new(DuckDuckGoSearch::default())],
            prompt: PromptTemplate::default(),
            input_slot: INPUT_SLOT.to_string(),
            history_slot: CHAT_HISTORY_SLOT.to_string(),
            scratchpad_slot: SCRATCHPAD_SLOT.to_string(),
            credential_env_var: Some(DEFAULT_CREDENTIAL_ENV.to_string()),
            settings: GenerationSettings::default(),
            timeout: DEFAULT_TIMEOUT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            verbose: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = credential.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_slots(
        mut self,
        input: impl Into<String>,
        history: impl Into<String>,
        scratchpad: impl Into<String>,
    ) -> Self {
        self.input_slot = input.into();
        self.history_slot = history.into();
        self.scratchpad_slot = scratchpad.into();
        self
    }

    pub fn with_credential_env_var(mut self, var: Option<String>) -> Self {
        self.credential_env_var = var;
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn has_credential(&self) -> bool {
        !self.credential.trim().is_empty()
    }

    /// Check everything that can be checked without calling out.
    pub fn validate(&self) -> Result<(), AskwebError> {
        if !self.has_credential() {
            return Err(AskwebError::Configuration(
                "No API key configured. Set GOOGLE_API_KEY or enter a key.".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(AskwebError::Configuration(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(AskwebError::Configuration(
                "timeout must be greater than zero".into(),
            ));
        }
        self.prompt.check_slots([
            self.input_slot.as_str(),
            self.history_slot.as_str(),
            self.scratchpad_slot.as_str(),
        ])
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tool_names: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();
        f.debug_struct("AgentConfig")
            .field("model", &self.model)
            .field("credential", &if self.has_credential() { "<set>" } else { "<empty>" })
            .field("base_url", &self.base_url)
            .field("tools", &tool_names)
            .field("input_slot", &self.input_slot)
            .field("history_slot", &self.history_slot)
            .field("scratchpad_slot", &self.scratchpad_slot)
            .field("credential_env_var", &self.credential_env_var)
            .field("timeout", &self.timeout)
            .field("max_iterations", &self.max_iterations)
            .field("verbose", &self.verbose)
            .finish()
    }
}
