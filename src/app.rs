//! Chat controller
//!
//! [`ChatApp`] owns the conversation store, the completion gateway, and the
//! current screen. Sending is split into [`ChatApp::begin_send`] and
//! [`ChatApp::finish_send`] so the gateway call happens without holding the
//! app: the reply is matched to the conversation captured when the prompt was
//! recorded, whatever the user did in the meantime.

use crate::conversation::{Conversation, ConversationStore, Message, MessageKind};
use crate::error::{ParleyError, Result};
use crate::providers::CompletionGateway;
use crate::screen::Screen;
use std::sync::Arc;

/// A prompt that has been recorded and is waiting for its reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    /// Conversation the reply belongs to
    pub conversation_id: String,
    /// Text sent to the gateway
    pub prompt: String,
}

/// What happened to a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The reply was appended to its conversation
    Delivered {
        conversation_id: String,
        reply: Message,
    },
    /// The conversation was deleted before the reply arrived
    Discarded { conversation_id: String },
}

/// Interactive chat state
pub struct ChatApp {
    store: ConversationStore,
    gateway: Arc<dyn CompletionGateway>,
    screen: Screen,
}

impl ChatApp {
    /// Create an app on the start screen
    pub fn new(store: ConversationStore, gateway: Arc<dyn CompletionGateway>) -> Self {
        Self {
            store,
            gateway,
            screen: Screen::Start,
        }
    }

    /// Current screen
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Read access to the conversation store
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Shared handle on the gateway
    pub fn gateway(&self) -> Arc<dyn CompletionGateway> {
        Arc::clone(&self.gateway)
    }

    /// The active conversation, if any
    pub fn active(&self) -> Option<&Conversation> {
        self.store.active()
    }

    /// Switch to the chat screen
    ///
    /// When there are no conversations yet an empty one is created so the
    /// chat screen always has something to show.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Storage` if creating the first conversation fails
    pub fn start_chat(&mut self) -> Result<()> {
        if self.store.is_empty() {
            self.store.create_conversation(None)?;
        }
        self.screen = Screen::Chat;
        Ok(())
    }

    /// Return to the start screen
    pub fn go_back(&mut self) {
        self.screen = Screen::Start;
    }

    /// Start a new conversation, optionally seeded with a first prompt
    pub fn new_chat(&mut self, seed: Option<&str>) -> Result<Conversation> {
        let conversation = self.store.create_conversation(seed)?;
        self.screen = Screen::Chat;
        Ok(conversation)
    }

    /// Make `id` the active conversation and return its messages
    pub fn select_chat(&mut self, id: &str) -> Result<Vec<Message>> {
        let messages = self.store.select_conversation(id)?;
        self.screen = Screen::Chat;
        Ok(messages)
    }

    /// Delete conversation `id`
    pub fn delete_chat(&mut self, id: &str) -> Result<()> {
        self.store.delete_conversation(id)
    }

    /// Resolve a full id, unique prefix, or `#N` to a conversation id
    pub fn resolve(&self, reference: &str) -> Result<String> {
        self.store.resolve(reference)
    }

    /// Record `text` as a prompt and capture where its reply should go
    ///
    /// Blank text is ignored and yields `Ok(None)`. With no active
    /// conversation a new one is created, seeded with `text`.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Storage` if the prompt cannot be recorded
    pub fn begin_send(&mut self, text: &str) -> Result<Option<PendingReply>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let conversation_id = match self.store.active_id().map(str::to_string) {
            Some(id) => {
                self.store.append_message(&id, MessageKind::Prompt, text)?;
                id
            }
            None => self.store.create_conversation(Some(text))?.id,
        };

        self.screen = Screen::Chat;

        Ok(Some(PendingReply {
            conversation_id,
            prompt: text.to_string(),
        }))
    }

    /// Start a new conversation whose first prompt is `text`
    ///
    /// The conversation and its prompt are written together, so a failure
    /// leaves no empty conversation behind. Blank text is ignored and yields
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Storage` if the conversation cannot be created
    pub fn begin_new_chat(&mut self, text: &str) -> Result<Option<PendingReply>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let conversation = self.new_chat(Some(text))?;

        Ok(Some(PendingReply {
            conversation_id: conversation.id,
            prompt: text.to_string(),
        }))
    }

    /// Record the gateway's answer to `pending`
    ///
    /// The reply goes to the conversation captured by `begin_send`, not to
    /// whichever one is active now. If that conversation has since been
    /// deleted the reply is dropped.
    ///
    /// # Errors
    ///
    /// A gateway error is returned unchanged; the prompt stays in history
    /// without a response. Storage errors from recording the reply are
    /// returned as well.
    pub fn finish_send(
        &mut self,
        pending: PendingReply,
        reply: Result<String>,
    ) -> Result<SendOutcome> {
        let text = reply?;

        if !self.store.contains(&pending.conversation_id) {
            tracing::warn!(
                "Discarding reply for deleted conversation {}",
                pending.conversation_id
            );
            return Ok(SendOutcome::Discarded {
                conversation_id: pending.conversation_id,
            });
        }

        let messages =
            self.store
                .append_message(&pending.conversation_id, MessageKind::Response, &text)?;

        let reply = messages.last().cloned().ok_or_else(|| {
            ParleyError::Storage(format!(
                "Conversation {} has no messages after append",
                pending.conversation_id
            ))
        })?;

        Ok(SendOutcome::Delivered {
            conversation_id: pending.conversation_id,
            reply,
        })
    }

    /// Send `text` and wait for the reply
    ///
    /// Returns `Ok(None)` for blank text.
    pub async fn send(&mut self, text: &str) -> Result<Option<SendOutcome>> {
        let Some(pending) = self.begin_send(text)? else {
            return Ok(None);
        };
        self.await_reply(pending).await.map(Some)
    }

    /// Start a new conversation with `text` and wait for the reply
    ///
    /// Returns `Ok(None)` for blank text.
    pub async fn send_new(&mut self, text: &str) -> Result<Option<SendOutcome>> {
        let Some(pending) = self.begin_new_chat(text)? else {
            return Ok(None);
        };
        self.await_reply(pending).await.map(Some)
    }

    /// Ask the gateway about `pending` and record the answer
    pub async fn await_reply(&mut self, pending: PendingReply) -> Result<SendOutcome> {
        let gateway = self.gateway();
        let reply = gateway.complete(&pending.prompt).await;
        self.finish_send(pending, reply)
    }
}
