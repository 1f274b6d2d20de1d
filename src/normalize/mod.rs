//! Coerces an agent's raw output into display text.
//!
//! Agents may answer with plain text, with a list of typed content parts
//! (`{"type": "text", "text": ...}`, thoughts, tool calls, ...), or with some
//! other JSON value. The chat layer only ever sees the string produced here.

use serde_json::Value;

/// Raw output of an agent invocation.
pub type RawAgentResult = Value;

/// Collapse a raw agent result into a single string.
///
/// Strings pass through untouched. Arrays are concatenated in order, keeping
/// bare string fragments and the `text` of fragments tagged `"type": "text"`;
/// every other fragment is dropped. Anything else is rendered as compact JSON.
pub fn normalize(raw: &RawAgentResult) -> String {
    match raw {
        Value::String(text) => text.clone(),
        Value::Array(fragments) => fragments.iter().filter_map(fragment_text).collect(),
        other => other.to_string(),
    }
}

fn fragment_text(fragment: &Value) -> Option<&str> {
    match fragment {
        Value::String(text) => Some(text),
        Value::Object(map) if map.get("type").and_then(Value::as_str) == Some("text") => {
            Some(map.get("text").and_then(Value::as_str).unwrap_or(""))
        }
        _ => None,
    }
}
