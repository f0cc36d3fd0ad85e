//! Conversation data model
//!
//! Messages and summaries are what gets persisted; [`Conversation`] is the
//! in-memory pairing of a summary with its loaded messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Written by the user
    Prompt,
    /// Returned by the completion endpoint
    Response,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompt => write!(f, "prompt"),
            Self::Response => write!(f, "response"),
        }
    }
}

/// One turn in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Message {
    /// Prompt or response
    pub kind: MessageKind,
    /// Message content, never blank
    pub text: String,
    /// Local creation time, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}

impl Message {
    /// Creates a message with an explicit timestamp
    pub fn new(kind: MessageKind, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// Index entry: what the chat list shows for a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationSummary {
    /// Conversation identifier
    pub id: String,
    /// Human-readable label derived from the creation time
    pub display_label: String,
}

/// A chat thread with its full message history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    /// Globally unique identifier, never reused
    pub id: String,
    /// Human-readable label, fixed at creation
    pub display_label: String,
    /// Messages, oldest first
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Index entry for this conversation
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            display_label: self.display_label.clone(),
        }
    }

    /// Shortened id used in listings
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

impl From<ConversationSummary> for Conversation {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            id: summary.id,
            display_label: summary.display_label,
            messages: Vec::new(),
        }
    }
}

/// First eight characters of an id, or the whole id if shorter
pub fn short_id(id: &str) -> &str {
    id.char_indices()
        .nth(8)
        .map(|(idx, _)| &id[..idx])
        .unwrap_or(id)
}
