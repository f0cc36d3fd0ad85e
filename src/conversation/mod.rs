//! Conversations: data model, persistence codec, and the store
//!
//! [`ConversationStore`] is the single source of truth for which
//! conversations exist, their messages, and which one is active.

pub mod codec;
pub mod ids;
pub mod store;
pub mod types;

pub use ids::{display_label, message_timestamp, new_conversation_id, now_local};
pub use store::{conversation_key, ConversationStore, INDEX_KEY};
pub use types::{short_id, Conversation, ConversationSummary, Message, MessageKind};
