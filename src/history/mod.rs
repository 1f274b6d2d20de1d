//! Per-session conversation memory.
//!
//! A [`HistoryStore`] maps a session key to an ordered list of [`Turn`]s.
//! Sessions spring into existence on first access and live as long as the
//! store does. Nothing is evicted and nothing is persisted; a durable
//! backend can be plugged in by implementing the trait.

mod turn;

pub use turn::{Turn, TurnRole};

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::types::ModelMessage;

/// Snapshot of one session's conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    key: String,
    turns: Vec<Turn>,
}

impl Session {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            turns: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render the turns as model messages for the history slot of a prompt.
    pub fn to_messages(&self) -> Vec<ModelMessage> {
        self.turns.iter().map(Turn::to_message).collect()
    }
}

/// Storage contract for conversation history.
pub trait HistoryStore: Send + Sync {
    /// Session for `key`, created empty on first access.
    fn get_history(&self, key: &str) -> Session;

    /// Append one turn to the session.
    fn append(&self, key: &str, turn: Turn);

    /// Append a user turn and its reply as a single step.
    ///
    /// Readers observe either both turns or neither.
    fn append_exchange(&self, key: &str, user: Turn, assistant: Turn);

    /// Turns of the session in insertion order.
    fn list(&self, key: &str) -> Vec<Turn>;

    /// Keys of every session created so far.
    fn session_keys(&self) -> Vec<String>;
}

/// Process-local history store.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    sessions: RwLock<HashMap<String, Vec<Turn>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_session<R>(&self, key: &str, f: impl FnOnce(&mut Vec<Turn>) -> R) -> R {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(sessions.entry(key.to_string()).or_default())
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn get_history(&self, key: &str) -> Session {
        let turns = self.with_session(key, |turns| turns.clone());
        Session {
            key: key.to_string(),
            turns,
        }
    }

    fn append(&self, key: &str, turn: Turn) {
        self.with_session(key, |turns| turns.push(turn));
    }

    fn append_exchange(&self, key: &str, user: Turn, assistant: Turn) {
        self.with_session(key, |turns| {
            turns.reserve(2);
            turns.push(user);
            turns.push(assistant);
        });
    }

    fn list(&self, key: &str) -> Vec<Turn> {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        sessions.get(key).cloned().unwrap_or_default()
    }

    fn session_keys(&self) -> Vec<String> {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = sessions.keys().cloned().collect();
        keys.sort();
        keys
    }
}
