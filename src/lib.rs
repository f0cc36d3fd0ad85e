//! Parley - terminal chat client library
//!
//! This library provides the core functionality for Parley: a persistent
//! store of chat conversations, a gateway to an OpenAI-compatible completion
//! endpoint, and the controller that ties them together for the CLI.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `conversation`: Conversation model, persistence codec, and the store
//! - `storage`: Durable key-value backends (sled, in-memory)
//! - `providers`: Completion gateway abstraction and OpenAI implementation
//! - `app`: Chat controller (screens, sending, reply matching)
//! - `config`: Configuration management and validation
//! - `credentials`: API key storage in the system keyring
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use parley::{ChatApp, Config, ConversationStore};
//! use parley::providers::create_gateway;
//! use parley::storage::SledStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = ConversationStore::open(Box::new(SledStore::open_default()?));
//!     let gateway = Arc::from(create_gateway(&config.gateway)?);
//!     let mut app = ChatApp::new(store, gateway);
//!     app.send("Hello!").await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod credentials;
pub mod error;
pub mod providers;
pub mod screen;
pub mod storage;

// Re-export commonly used types
pub use app::{ChatApp, PendingReply, SendOutcome};
pub use config::Config;
pub use conversation::{Conversation, ConversationStore, Message, MessageKind};
pub use error::{ParleyError, Result};
pub use screen::Screen;

#[cfg(test)]
pub mod test_utils;
