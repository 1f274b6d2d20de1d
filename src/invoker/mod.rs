//! One question in, one answer out.
//!
//! [`AgentInvoker`] checks configuration, obtains an agent, calls it with
//! the session's prior turns, normalizes the raw result and records the
//! exchange. History is only written when the whole call succeeds, and then
//! both turns are written together.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::agent::{Agent, AgentCache, AgentConfig, AgentFactory, AgentInput};
use crate::error::{AskwebError, InvokeError};
use crate::history::{HistoryStore, Turn};
use crate::normalize::normalize;
use crate::prompt::PromptVariables;
use crate::util::timeout::with_timeout;

pub struct AgentInvoker {
    history: Arc<dyn HistoryStore>,
    factory: Arc<dyn AgentFactory>,
    cache: Option<Arc<AgentCache>>,
}

impl AgentInvoker {
    /// Invoker that reuses built agents through a fresh cache.
    pub fn new(history: Arc<dyn HistoryStore>, factory: Arc<dyn AgentFactory>) -> Self {
        Self {
            history,
            factory,
            cache: Some(Arc::new(AgentCache::new())),
        }
    }

    /// Share `cache` with other invokers.
    pub fn with_cache(mut self, cache: Arc<AgentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build a new agent on every call.
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Answer `user_text` in the context of session `session_key`.
    ///
    /// On success the user turn and the normalized reply are appended to the
    /// session. On failure the session is left unchanged.
    pub async fn invoke(
        &self,
        session_key: &str,
        user_text: &str,
        config: &AgentConfig,
    ) -> Result<String, InvokeError> {
        config.validate().map_err(configuration_error)?;
        export_credential(config);

        let agent = self.agent_for(config).map_err(configuration_error)?;

        let prior = self.history.get_history(session_key);
        let input = AgentInput {
            session_key: session_key.to_string(),
            variables: PromptVariables::new()
                .text(config.input_slot.clone(), user_text)
                .messages(config.history_slot.clone(), prior.to_messages()),
        };

        debug!(session = session_key, prior_turns = prior.len(), "Invoking agent");
        let started = Instant::now();
        let output = with_timeout(config.timeout, agent.invoke(input))
            .await
            .map_err(|e| {
                warn!(session = session_key, error = %e, "Agent invocation failed");
                InvokeError::Upstream(e)
            })?;

        let reply = normalize(&output.output);
        info!(
            session = session_key,
            tool_calls = output.steps.len(),
            input_tokens = output.usage.input_tokens,
            output_tokens = output.usage.output_tokens,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Agent replied"
        );

        self.history.append_exchange(
            session_key,
            Turn::user(user_text),
            Turn::assistant(reply.clone()),
        );
        Ok(reply)
    }

    fn agent_for(&self, config: &AgentConfig) -> Result<Arc<dyn Agent>, AskwebError> {
        match &self.cache {
            Some(cache) => cache.get_or_build(config, self.factory.as_ref()),
            None => self.factory.build(config),
        }
    }
}

impl std::fmt::Debug for AgentInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentInvoker")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn configuration_error(err: AskwebError) -> InvokeError {
    match err {
        AskwebError::Configuration(message) => InvokeError::Configuration(message),
        other => InvokeError::Configuration(other.to_string()),
    }
}

static EXPORT_LOCK: Mutex<()> = Mutex::new(());

/// Publish the credential in `config.credential_env_var` for tools and client
/// libraries that read it from the environment.
///
/// The variable is process-wide, so with concurrent sessions on different
/// keys the last invocation to start wins. Agents never read it back: each
/// one is built with its own credential. Writes are serialized here, but a
/// process that reads the environment from other threads should disable the
/// export (`credential_env_var = None`) and set the variable once at startup.
fn export_credential(config: &AgentConfig) {
    let Some(var) = config.credential_env_var.as_deref() else {
        return;
    };
    let credential = config.credential.trim();
    let _guard = EXPORT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if std::env::var(var).ok().as_deref() != Some(credential) {
        std::env::set_var(var, credential);
    }
}
