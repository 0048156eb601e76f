//! Per-user conversation state.

/// Process-wide user id to session mapping.
pub mod registry;

use serde::{Deserialize, Serialize};

pub use registry::{SessionHandle, SessionRegistry};

/// Author of a message in the conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged entry of the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Conversation state of one user: the model to call and the ordered history.
///
/// Order is meaningful: the history is sent to the completion endpoint as-is.
#[derive(Debug, Clone)]
pub struct Session {
    model: String,
    messages: Vec<Message>,
    max_messages: usize,
}

impl Session {
    /// Creates an empty session.
    ///
    /// `max_messages` bounds the history; `0` keeps it unbounded.
    pub fn new(model: impl Into<String>, max_messages: usize) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            max_messages,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a message, dropping the oldest ones if the bound is exceeded.
    pub fn append_message(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));

        if self.max_messages > 0 && self.messages.len() > self.max_messages {
            let overflow = self.messages.len() - self.max_messages;
            self.messages.drain(..overflow);
            tracing::debug!(dropped = overflow, "Trimmed conversation history");
        }
    }

    /// Starts a new conversation.
    pub fn reset(&mut self) {
        self.messages.clear();
    }
}
