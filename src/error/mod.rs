//! Error types for askweb.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for provider, tool, and configuration operations.
#[derive(Error, Debug)]
pub enum AskwebError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Provider error: {provider}: {message}")]
    Provider { provider: String, message: String },
}

impl AskwebError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) | Self::ConfigFile(_) | Self::Prompt(_) => {
                ErrorCategory::Configuration
            }
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit => RecoverySuggestion::RetryLater,
            ErrorCategory::Network => RecoverySuggestion::RetryLater,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Server => RecoverySuggestion::RetryLater,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::ToolExecution => RecoverySuggestion::RetryLater,
            _ => RecoverySuggestion::ReportIssue,
        }
    }
}

/// Failure of one agent invocation, as seen by the chat layer.
///
/// `Configuration` is raised before any external call is made;
/// `Upstream` wraps whatever the agent call chain produced.
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream error: {0}")]
    Upstream(#[source] AskwebError),
}

impl InvokeError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AskwebError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_maps_to_category() {
        assert_eq!(
            AskwebError::api(403, "denied").category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            AskwebError::api(429, "slow down").category(),
            ErrorCategory::RateLimit
        );
        assert_eq!(
            AskwebError::api(503, "unavailable").category(),
            ErrorCategory::Server
        );
        assert_eq!(AskwebError::api(400, "bad").category(), ErrorCategory::Api);
    }

    #[test]
    fn prompt_errors_are_configuration_problems() {
        let err = AskwebError::Prompt("missing variable".into());
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(!err.is_retryable());
        assert_eq!(
            err.recovery_suggestion(),
            RecoverySuggestion::CheckConfiguration
        );
    }

    #[test]
    fn timeouts_are_retryable() {
        let err = AskwebError::Timeout(1500);
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Timeout after 1500ms");
    }

    #[test]
    fn upstream_display_includes_source_message() {
        let err = InvokeError::Upstream(AskwebError::api(500, "boom"));
        assert_eq!(err.to_string(), "Upstream error: API error (status 500): boom");
        assert!(!err.is_configuration());
    }
}
