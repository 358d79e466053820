//! Message and Transcript domain types.
//!
//! These are the core value objects that flow through the system: the user
//! speaks → the engine streams a reply from the provider → tool results come
//! back as system messages → the whole ordered sequence goes out again on
//! the next turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one agent session. Scopes the transcript log file and
/// groups messages for replay. Never changes across `clear` operations
/// within one process run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh random session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions and tool results
    System,
    /// The end user
    User,
    /// The model
    Assistant,
}

/// A single message in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// When this message was appended
    pub timestamp: DateTime<Utc>,

    /// Which model produced this message (assistant messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Message {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            timestamp: Utc::now(),
            model: None,
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            model: None,
        }
    }

    /// Create a new assistant message tagged with the model that wrote it.
    pub fn assistant(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            model: Some(model.into()),
        }
    }
}

/// An ordered, insertion-order-significant sequence of messages.
///
/// Invariant: index 0 is always the sole seeded system-prompt message.
/// Tool-result system messages appended later are additional system-role
/// entries; the provider adapters merge them per wire shape. A transcript is
/// owned exclusively by one conversation engine and is discarded and rebuilt
/// wholesale on `clear`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// The session this transcript belongs to
    pub session_id: SessionId,

    /// Ordered messages
    pub messages: Vec<Message>,
}

impl Transcript {
    /// Create a transcript seeded with the system prompt at index 0.
    pub fn seeded(session_id: SessionId, system_prompt: impl Into<String>) -> Self {
        Self {
            session_id,
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The most recently appended message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
