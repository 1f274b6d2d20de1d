//! Chat prompt templates with named slots.
//!
//! A template is an ordered list of entries. Text entries may reference
//! variables as `{name}`; placeholder entries splice in a whole list of
//! messages (conversation history, tool-call scratchpad). Rendering requires
//! the supplied variables to match the declared slots exactly.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::AskwebError;
use crate::types::ModelMessage;

/// Slot holding prior conversation turns.
pub const CHAT_HISTORY_SLOT: &str = "chat_history";
/// Slot holding the current user input.
pub const INPUT_SLOT: &str = "input";
/// Slot holding intermediate tool-calling messages.
pub const SCRATCHPAD_SLOT: &str = "agent_scratchpad";

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Use DuckDuckGo to search for current information if needed.";

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("variable pattern is valid")
    })
}

/// One entry of a chat template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEntry {
    System(String),
    Human(String),
    Ai(String),
    /// Expands to the message list bound to the named slot.
    Placeholder(String),
}

/// Value bound to a template slot.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptValue {
    Text(String),
    Messages(Vec<ModelMessage>),
}

/// Slot bindings for one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptVariables {
    values: BTreeMap<String, PromptValue>,
}

impl PromptVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .insert(name.into(), PromptValue::Text(value.into()));
        self
    }

    pub fn messages(mut self, name: impl Into<String>, value: Vec<ModelMessage>) -> Self {
        self.values.insert(name.into(), PromptValue::Messages(value));
        self
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.values.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&PromptValue> {
        self.values.get(name)
    }
}

/// Ordered chat template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    entries: Vec<PromptEntry>,
}

impl PromptTemplate {
    pub fn new(entries: Vec<PromptEntry>) -> Self {
        Self { entries }
    }

    /// System instructions, prior history, the user input, then the scratchpad.
    pub fn tool_calling(system: impl Into<String>) -> Self {
        Self::new(vec![
            PromptEntry::System(system.into()),
            PromptEntry::Placeholder(CHAT_HISTORY_SLOT.to_string()),
            PromptEntry::Human(format!("{{{INPUT_SLOT}}}")),
            PromptEntry::Placeholder(SCRATCHPAD_SLOT.to_string()),
        ])
    }

    pub fn entries(&self) -> &[PromptEntry] {
        &self.entries
    }

    /// Every slot name the template declares.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for entry in &self.entries {
            match entry {
                PromptEntry::System(text) | PromptEntry::Human(text) | PromptEntry::Ai(text) => {
                    for caps in variable_pattern().captures_iter(text) {
                        names.insert(caps[1].to_string());
                    }
                }
                PromptEntry::Placeholder(name) => {
                    names.insert(name.clone());
                }
            }
        }
        names
    }

    /// Fail unless `provided` names exactly the declared slots.
    pub fn check_slots<'a>(
        &self,
        provided: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), AskwebError> {
        let declared = self.variables();
        let provided: BTreeSet<String> = provided.into_iter().map(str::to_string).collect();

        let missing: Vec<&str> = declared.difference(&provided).map(String::as_str).collect();
        let unexpected: Vec<&str> = provided.difference(&declared).map(String::as_str).collect();

        if missing.is_empty() && unexpected.is_empty() {
            return Ok(());
        }

        let mut problems = Vec::new();
        if !missing.is_empty() {
            problems.push(format!("missing slots [{}]", missing.join(", ")));
        }
        if !unexpected.is_empty() {
            problems.push(format!("unknown slots [{}]", unexpected.join(", ")));
        }
        Err(AskwebError::Prompt(problems.join("; ")))
    }

    /// Produce the message list for one model call.
    pub fn render(&self, variables: &PromptVariables) -> Result<Vec<ModelMessage>, AskwebError> {
        let names = variables.names();
        self.check_slots(names.iter().map(String::as_str))?;

        let mut messages = Vec::new();
        for entry in &self.entries {
            match entry {
                PromptEntry::System(text) => {
                    messages.push(ModelMessage::system(interpolate(text, variables)?));
                }
                PromptEntry::Human(text) => {
                    messages.push(ModelMessage::user(interpolate(text, variables)?));
                }
                PromptEntry::Ai(text) => {
                    messages.push(ModelMessage::assistant(interpolate(text, variables)?));
                }
                PromptEntry::Placeholder(name) => match variables.get(name) {
                    Some(PromptValue::Messages(list)) => messages.extend(list.iter().cloned()),
                    Some(PromptValue::Text(_)) => {
                        return Err(AskwebError::Prompt(format!(
                            "slot '{name}' expects a message list"
                        )));
                    }
                    None => unreachable!("slot presence checked above"),
                },
            }
        }
        Ok(messages)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::tool_calling(DEFAULT_SYSTEM_PROMPT)
    }
}

// Values are inserted in a single pass, so braces inside user input are never expanded.
fn interpolate(text: &str, variables: &PromptVariables) -> Result<String, AskwebError> {
    let mut failure = None;
    let rendered = variable_pattern().replace_all(text, |caps: &regex::Captures<'_>| {
        match variables.get(&caps[1]) {
            Some(PromptValue::Text(value)) => value.clone(),
            _ => {
                failure.get_or_insert_with(|| caps[1].to_string());
                String::new()
            }
        }
    });
    match failure {
        Some(name) => Err(AskwebError::Prompt(format!(
            "slot '{name}' expects text"
        ))),
        None => Ok(rendered.into_owned()),
    }
}
