//! The conversation store
//!
//! Keeps the in-memory list of conversations and the durable key-value
//! representation consistent. Every mutation is written through before the
//! in-memory view changes, so a failed write leaves no partial effect and an
//! acknowledged write survives a restart.
//!
//! Durable layout:
//!
//! - `index` holds the summaries (`id`, `display_label`), newest first
//! - `conversation/<id>` holds that conversation's message sequence

use super::codec::{decode_index, decode_messages, encode_index, encode_messages};
use super::ids::{display_label, message_timestamp, new_conversation_id, now_local};
use super::types::{Conversation, ConversationSummary, Message, MessageKind};
use crate::error::{ParleyError, Result};
use crate::storage::{KeyValueStore, WriteOp};

/// Key of the persisted index
pub const INDEX_KEY: &str = "index";

/// Prefix of per-conversation message entries
pub const CONVERSATION_KEY_PREFIX: &str = "conversation/";

/// Key holding the message sequence of conversation `id`
pub fn conversation_key(id: &str) -> String {
    format!("{}{}", CONVERSATION_KEY_PREFIX, id)
}

/// Canonical list of conversations and the active selection
///
/// # Examples
///
/// ```
/// use parley::conversation::{ConversationStore, MessageKind};
/// use parley::storage::MemoryStore;
///
/// # fn main() -> parley::error::Result<()> {
/// let mut store = ConversationStore::open(Box::new(MemoryStore::new()));
/// let chat = store.create_conversation(Some("Hello"))?;
/// assert_eq!(store.active_id(), Some(chat.id.as_str()));
///
/// let messages = store.append_message(&chat.id, MessageKind::Response, "Hi there")?;
/// assert_eq!(messages.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct ConversationStore {
    kv: Box<dyn KeyValueStore>,
    conversations: Vec<Conversation>,
    active: Option<String>,
}

impl ConversationStore {
    /// Open a store over `kv` and load whatever it already holds
    ///
    /// The newest conversation becomes active, or none if there are none.
    pub fn open(kv: Box<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            kv,
            conversations: Vec::new(),
            active: None,
        };
        store.reload();
        store
    }

    /// Read the persisted index
    ///
    /// A missing, unreadable, or corrupt index is treated as empty. This never
    /// writes and never fails.
    pub fn load_all(&self) -> Vec<ConversationSummary> {
        let raw = match self.kv.get(INDEX_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read conversation index, treating as empty: {}", e);
                return Vec::new();
            }
        };

        match decode_index(&raw) {
            Ok(summaries) => summaries,
            Err(e) => {
                tracing::warn!("Conversation index is corrupt, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Rebuild the in-memory view from durable storage
    ///
    /// Message sequences are hydrated best-effort; an unreadable entry shows as
    /// an empty conversation, and selecting or appending to it fails with
    /// `ParleyError::Storage` until the entry is readable again. The active
    /// conversation is kept if it still exists, otherwise the newest one is
    /// chosen.
    pub fn reload(&mut self) {
        let conversations: Vec<Conversation> = self
            .load_all()
            .into_iter()
            .map(|summary| {
                let messages = self.read_messages(&summary.id).unwrap_or_else(|e| {
                    tracing::warn!("Could not load messages for {}: {}", summary.id, e);
                    Vec::new()
                });
                Conversation {
                    messages,
                    ..Conversation::from(summary)
                }
            })
            .collect();

        self.conversations = conversations;

        let still_present = self
            .active
            .as_deref()
            .is_some_and(|id| self.position(id).is_some());
        if !still_present {
            self.active = self.conversations.first().map(|c| c.id.clone());
        }

        tracing::debug!("Loaded {} conversations", self.conversations.len());
    }

    /// Start a new conversation and make it active
    ///
    /// A blank or absent `seed_text` yields an empty conversation; otherwise
    /// the conversation starts with one prompt message holding `seed_text`.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Storage` if the write fails; nothing changes then.
    pub fn create_conversation(&mut self, seed_text: Option<&str>) -> Result<Conversation> {
        let now = now_local();
        let messages = match seed_text {
            Some(text) if !text.trim().is_empty() => {
                vec![Message::new(
                    MessageKind::Prompt,
                    text,
                    message_timestamp(&now),
                )]
            }
            _ => Vec::new(),
        };

        let conversation = Conversation {
            id: new_conversation_id(),
            display_label: display_label(&now),
            messages,
        };

        let mut index = Vec::with_capacity(self.conversations.len() + 1);
        index.push(conversation.summary());
        index.extend(self.conversations.iter().map(Conversation::summary));

        self.kv.apply(&[
            WriteOp::put(
                conversation_key(&conversation.id),
                encode_messages(&conversation.messages)?,
            ),
            WriteOp::put(INDEX_KEY, encode_index(&index)?),
        ])?;

        tracing::debug!(
            "Created conversation {} with {} messages",
            conversation.id,
            conversation.messages.len()
        );

        self.conversations.insert(0, conversation.clone());
        self.active = Some(conversation.id.clone());
        Ok(conversation)
    }

    /// Append a message to conversation `id`
    ///
    /// The new message is added to the stored sequence, not to the in-memory
    /// copy, and is never stamped earlier than the message before it. Returns
    /// the full, updated message sequence. Earlier messages are never touched.
    ///
    /// # Errors
    ///
    /// - `ParleyError::NotFound` if `id` is not in the index
    /// - `ParleyError::InvalidMessage` if `text` is blank
    /// - `ParleyError::Storage` if the stored entry cannot be read or decoded,
    ///   or the write fails; nothing is written or changed then
    pub fn append_message(
        &mut self,
        id: &str,
        kind: MessageKind,
        text: &str,
    ) -> Result<Vec<Message>> {
        let position = self.require(id)?;

        if text.trim().is_empty() {
            return Err(ParleyError::InvalidMessage("message text is empty".to_string()).into());
        }

        let mut messages = self.read_messages(id)?;

        let mut timestamp = message_timestamp(&now_local());
        if let Some(last) = messages.last() {
            // wall clock can step back (DST end); keep the sequence ordered
            if last.timestamp > timestamp {
                timestamp = last.timestamp.clone();
            }
        }
        messages.push(Message::new(kind, text, timestamp));

        self.kv
            .apply(&[WriteOp::put(conversation_key(id), encode_messages(&messages)?)])?;

        tracing::debug!("Appended {} to {} ({} messages)", kind, id, messages.len());

        self.conversations[position].messages = messages.clone();
        Ok(messages)
    }

    /// Make conversation `id` active and return its messages
    ///
    /// Messages are read from durable storage, not from memory.
    ///
    /// # Errors
    ///
    /// - `ParleyError::NotFound` if `id` is not in the index
    /// - `ParleyError::Storage` if the stored entry cannot be read or decoded
    pub fn select_conversation(&mut self, id: &str) -> Result<Vec<Message>> {
        let position = self.require(id)?;
        let messages = self.read_messages(id)?;

        self.conversations[position].messages = messages.clone();
        self.active = Some(id.to_string());
        Ok(messages)
    }

    /// Delete conversation `id` and its stored messages
    ///
    /// If it was active, the newest remaining conversation becomes active, or
    /// none when the list is now empty. Deleting any other conversation leaves
    /// the active one alone.
    ///
    /// # Errors
    ///
    /// - `ParleyError::NotFound` if `id` is not in the index
    /// - `ParleyError::Storage` if the write fails; nothing changes then
    pub fn delete_conversation(&mut self, id: &str) -> Result<()> {
        let position = self.require(id)?;

        let remaining: Vec<ConversationSummary> = self
            .conversations
            .iter()
            .filter(|c| c.id != id)
            .map(Conversation::summary)
            .collect();

        self.kv.apply(&[
            WriteOp::put(INDEX_KEY, encode_index(&remaining)?),
            WriteOp::remove(conversation_key(id)),
        ])?;

        self.conversations.remove(position);
        if self.active.as_deref() == Some(id) {
            self.active = self.conversations.first().map(|c| c.id.clone());
        }

        tracing::debug!("Deleted conversation {}", id);
        Ok(())
    }

    /// Resolve a user-supplied reference to a full conversation id
    ///
    /// Accepts a full id, a unique id prefix, or `#N` for the N-th entry of
    /// the chat list (1-based, newest first).
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::NotFound` if nothing matches or a prefix is
    /// ambiguous.
    pub fn resolve(&self, reference: &str) -> Result<String> {
        let reference = reference.trim();

        if let Some(number) = reference.strip_prefix('#') {
            return number
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| self.conversations.get(idx))
                .map(|c| c.id.clone())
                .ok_or_else(|| ParleyError::NotFound(reference.to_string()).into());
        }

        if reference.is_empty() {
            return Err(ParleyError::NotFound("empty reference".to_string()).into());
        }

        if self.position(reference).is_some() {
            return Ok(reference.to_string());
        }

        let mut matches = self
            .conversations
            .iter()
            .filter(|c| c.id.starts_with(reference));
        match (matches.next(), matches.next()) {
            (Some(found), None) => Ok(found.id.clone()),
            (Some(_), Some(_)) => Err(ParleyError::NotFound(format!(
                "{} matches more than one conversation",
                reference
            ))
            .into()),
            _ => Err(ParleyError::NotFound(reference.to_string()).into()),
        }
    }

    /// All conversations, newest first
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Summaries of all conversations, newest first
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.conversations.iter().map(Conversation::summary).collect()
    }

    /// Look up a conversation by full id
    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.position(id).map(|idx| &self.conversations[idx])
    }

    /// Returns true if `id` is in the index
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Id of the active conversation
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active conversation
    pub fn active(&self) -> Option<&Conversation> {
        self.active_id().and_then(|id| self.get(id))
    }

    /// Number of conversations
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Returns true if there are no conversations
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.conversations.iter().position(|c| c.id == id)
    }

    fn require(&self, id: &str) -> Result<usize> {
        self.position(id)
            .ok_or_else(|| ParleyError::NotFound(id.to_string()).into())
    }

    fn read_messages(&self, id: &str) -> Result<Vec<Message>> {
        match self.kv.get(&conversation_key(id))? {
            Some(raw) => decode_messages(&raw),
            None => Ok(Vec::new()),
        }
    }
}
