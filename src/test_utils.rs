//! Test utilities for Parley
//!
//! Shared helpers for unit tests: in-memory stores, a temporary sled
//! database, a configuration fixture, and error-kind assertions.

use crate::conversation::ConversationStore;
use crate::error::ParleyError;
use crate::storage::{MemoryStore, SledStore};
use std::sync::Arc;
use tempfile::TempDir;

/// Conversation store over a fresh in-memory backend
pub fn memory_conversation_store() -> ConversationStore {
    ConversationStore::open(Box::new(MemoryStore::new()))
}

/// Conversation store plus a handle on its backend, for inspecting raw entries
pub fn memory_conversation_store_with_backend() -> (ConversationStore, Arc<MemoryStore>) {
    let kv = Arc::new(MemoryStore::new());
    (ConversationStore::open(Box::new(kv.clone())), kv)
}

/// Sled store in a temporary directory
///
/// Returns the `TempDir` too so the caller keeps it alive.
///
/// # Panics
///
/// Panics if the directory or database cannot be created
pub fn temp_sled_store() -> (SledStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let store =
        SledStore::open(dir.path().join("conversations.db")).expect("Failed to open sled store");
    (store, dir)
}

/// Assert that `error` carries a [`ParleyError`] matching `predicate`
///
/// # Panics
///
/// Panics if the error is not a `ParleyError` or the predicate fails
pub fn assert_parley_error(error: &anyhow::Error, predicate: fn(&ParleyError) -> bool) {
    let kind = error
        .downcast_ref::<ParleyError>()
        .unwrap_or_else(|| panic!("Expected ParleyError, got: {}", error));
    assert!(predicate(kind), "Unexpected error kind: {}", kind);
}

/// Create a test configuration YAML string pointing at a local endpoint
pub fn test_config_yaml() -> String {
    r#"
gateway:
  endpoint: http://127.0.0.1:8080/v1/chat/completions
  model: test-model
  max_tokens: 64
  timeout_seconds: 5
storage:
  ephemeral: true
chat:
  show_timestamps: false
  typing_indicator: false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_memory_conversation_store_is_empty() {
        let store = memory_conversation_store();
        assert!(store.is_empty());
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn test_assert_parley_error_matches() {
        let err: anyhow::Error = ParleyError::Storage("disk".to_string()).into();
        assert_parley_error(&err, |e| matches!(e, ParleyError::Storage(_)));
    }

    #[test]
    #[should_panic(expected = "Expected ParleyError")]
    fn test_assert_parley_error_rejects_foreign_error() {
        let err = anyhow::anyhow!("plain");
        assert_parley_error(&err, |_| true);
    }

    #[test]
    fn test_test_config_yaml_parses_and_validates() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert_eq!(config.gateway.model, "test-model");
        assert!(config.storage.ephemeral);
        assert!(config.validate().is_ok());
    }
}
