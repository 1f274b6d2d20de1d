//! Configuration system (layered: explicit > env > config file > defaults).

pub mod file;

pub use file::{ConfigFile, SearchSection};

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::agent::config::{DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use crate::agent::AgentConfig;
use crate::error::AskwebError;
use crate::prompt::{PromptTemplate, DEFAULT_SYSTEM_PROMPT};
use crate::tools::{DuckDuckGoSearch, SearchSettings};
use crate::types::GenerationSettings;

/// Environment variables consulted, in the order they are applied.
pub const ENV_VARS: [&str; 10] = [
    "GOOGLE_API_KEY",
    "GEMINI_API_KEY",
    "ASKWEB_MODEL",
    "GEMINI_BASE_URL",
    "ASKWEB_TIMEOUT_SECS",
    "ASKWEB_MAX_ITERATIONS",
    "ASKWEB_SESSION",
    "ASKWEB_SEARCH_URL",
    "ASKWEB_SEARCH_REGION",
    "ASKWEB_VERBOSE",
];

/// Values given explicitly, usually from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub session: Option<String>,
    pub timeout_secs: Option<u64>,
    pub verbose: bool,
}

/// Resolved application configuration.
///
/// Resolution order, highest first:
/// 1. Explicit overrides
/// 2. Environment (a `.env` file is loaded first if present)
/// 3. `~/.askweb/config.toml` or the file passed to [`AskwebConfig::load`]
/// 4. Built-in defaults
#[derive(Clone, PartialEq)]
pub struct AskwebConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub max_iterations: usize,
    pub system_prompt: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub session: Option<String>,
    pub search: SearchSettings,
    pub verbose: bool,
}

impl Default for AskwebConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: None,
            max_tokens: None,
            session: None,
            search: SearchSettings::default(),
            verbose: false,
        }
    }
}

impl fmt::Debug for AskwebConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AskwebConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_iterations", &self.max_iterations)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("session", &self.session)
            .field("search", &self.search)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl AskwebConfig {
    /// Resolve every layer. `path` replaces the default config file location.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, AskwebError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        let mut config = Self::default();
        let file_path = path.map(Path::to_path_buf).or_else(ConfigFile::default_path);
        if let Some(file_path) = file_path {
            match ConfigFile::load(&file_path)? {
                Some(file) => {
                    debug!(path = %file_path.display(), "Loaded config file");
                    config.apply_file(file);
                }
                None if path.is_some() => {
                    return Err(AskwebError::Configuration(format!(
                        "config file not found: {}",
                        file_path.display()
                    )));
                }
                None => {}
            }
        }
        config.apply_env()?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(key) = file.api_key {
            self.api_key = Some(key);
        }
        if let Some(model) = file.model {
            self.model = model;
        }
        if let Some(url) = file.base_url {
            self.base_url = Some(url);
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(max) = file.max_iterations {
            self.max_iterations = max;
        }
        if let Some(prompt) = file.system_prompt {
            self.system_prompt = prompt;
        }
        if let Some(temperature) = file.temperature {
            self.temperature = Some(temperature);
        }
        if let Some(max) = file.max_tokens {
            self.max_tokens = Some(max);
        }
        if let Some(verbose) = file.verbose {
            self.verbose = verbose;
        }
        if let Some(url) = file.search.base_url {
            self.search.base_url = url;
        }
        if let Some(region) = file.search.region {
            self.search.region = region;
        }
        if let Some(max) = file.search.max_results {
            self.search.max_results = max;
        }
    }

    /// Apply the process environment.
    pub fn apply_env(&mut self) -> Result<(), AskwebError> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Apply environment-style values from `lookup`. Empty values are ignored.
    pub fn apply_env_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), AskwebError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GOOGLE_API_KEY").or_else(|| get("GEMINI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = get("ASKWEB_MODEL") {
            self.model = model;
        }
        if let Some(url) = get("GEMINI_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Some(secs) = get("ASKWEB_TIMEOUT_SECS") {
            self.timeout = Duration::from_secs(parse_env("ASKWEB_TIMEOUT_SECS", &secs)?);
        }
        if let Some(max) = get("ASKWEB_MAX_ITERATIONS") {
            self.max_iterations = parse_env("ASKWEB_MAX_ITERATIONS", &max)?;
        }
        if let Some(session) = get("ASKWEB_SESSION") {
            self.session = Some(session);
        }
        if let Some(url) = get("ASKWEB_SEARCH_URL") {
            self.search.base_url = url;
        }
        if let Some(region) = get("ASKWEB_SEARCH_REGION") {
            self.search.region = region;
        }
        if let Some(verbose) = get("ASKWEB_VERBOSE") {
            self.verbose = parse_env("ASKWEB_VERBOSE", &verbose)?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(key) = overrides.api_key {
            self.api_key = Some(key);
        }
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(session) = overrides.session {
            self.session = Some(session);
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if overrides.verbose {
            self.verbose = true;
        }
    }

    /// Agent configuration for these settings. A missing key yields an empty
    /// credential, which the invoker reports as a configuration error.
    pub fn agent_config(&self) -> AgentConfig {
        let mut config = AgentConfig::new(self.api_key.clone().unwrap_or_default())
            .with_model(self.model.clone())
            .with_tools(vec![Arc::new(DuckDuckGoSearch::new(self.search.clone()))])
            .with_prompt(PromptTemplate::tool_calling(self.system_prompt.clone()))
            .with_settings(
                GenerationSettings::builder()
                    .maybe_temperature(self.temperature)
                    .maybe_max_tokens(self.max_tokens)
                    .build(),
            )
            .with_timeout(self.timeout)
            .with_max_iterations(self.max_iterations)
            .with_verbose(self.verbose);
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.clone());
        }
        config
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T, AskwebError> {
    value.trim().parse().map_err(|_| {
        AskwebError::Configuration(format!("{name} has an invalid value: {value}"))
    })
}
