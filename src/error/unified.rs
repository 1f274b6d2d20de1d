//! Error classification and user-facing recovery hints.

use std::fmt;

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    ToolExecution,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryLater,
    CheckCredentials,
    CheckConfiguration,
    IncreaseTimeout,
    ReportIssue,
}

impl RecoverySuggestion {
    /// Short hint shown next to an error message.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::RetryLater => "The service may be busy; try again in a moment.",
            Self::CheckCredentials => "Check that your API key is valid.",
            Self::CheckConfiguration => "Check your askweb configuration.",
            Self::IncreaseTimeout => "The request took too long; consider raising --timeout.",
            Self::ReportIssue => "If this keeps happening, please report it.",
        }
    }
}

impl fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hint())
    }
}
