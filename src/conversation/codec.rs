//! JSON encoding of the persisted index and message sequences
//!
//! Decoding is strict: anything that does not match the expected shape, or a
//! record that breaks an invariant (blank text, blank id, duplicate id), is a
//! `ParleyError::Storage`.

use super::types::{ConversationSummary, Message};
use crate::error::{ParleyError, Result};
use std::collections::HashSet;

/// Serialize the index (summaries only, newest first)
pub fn encode_index(summaries: &[ConversationSummary]) -> Result<String> {
    serde_json::to_string(summaries)
        .map_err(|e| ParleyError::Storage(format!("Failed to encode index: {}", e)).into())
}

/// Parse and validate a persisted index
pub fn decode_index(raw: &str) -> Result<Vec<ConversationSummary>> {
    let summaries: Vec<ConversationSummary> = serde_json::from_str(raw)
        .map_err(|e| ParleyError::Storage(format!("Failed to decode index: {}", e)))?;

    let mut seen = HashSet::new();
    for summary in &summaries {
        if summary.id.trim().is_empty() {
            return Err(ParleyError::Storage("Index entry has an empty id".to_string()).into());
        }
        if !seen.insert(summary.id.as_str()) {
            return Err(ParleyError::Storage(format!(
                "Index lists conversation {} more than once",
                summary.id
            ))
            .into());
        }
    }

    Ok(summaries)
}

/// Serialize a conversation's message sequence
pub fn encode_messages(messages: &[Message]) -> Result<String> {
    serde_json::to_string(messages)
        .map_err(|e| ParleyError::Storage(format!("Failed to encode messages: {}", e)).into())
}

/// Parse and validate a persisted message sequence
pub fn decode_messages(raw: &str) -> Result<Vec<Message>> {
    let messages: Vec<Message> = serde_json::from_str(raw)
        .map_err(|e| ParleyError::Storage(format!("Failed to decode messages: {}", e)))?;

    if let Some(position) = messages.iter().position(|m| m.text.trim().is_empty()) {
        return Err(ParleyError::Storage(format!(
            "Stored message {} has empty text",
            position
        ))
        .into());
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::MessageKind;

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::new(MessageKind::Prompt, "Hello", "2026-01-01 10:00:00"),
            Message::new(
                MessageKind::Response,
                "Hi there, \"quoted\" and ünïcödé 👋",
                "2026-01-01 10:00:02",
            ),
        ]
    }

    #[test]
    fn test_messages_roundtrip() {
        let messages = sample_messages();
        let encoded = encode_messages(&messages).expect("encode failed");
        assert_eq!(decode_messages(&encoded).expect("decode failed"), messages);
    }

    #[test]
    fn test_empty_messages_roundtrip() {
        let encoded = encode_messages(&[]).expect("encode failed");
        assert_eq!(encoded, "[]");
        assert!(decode_messages(&encoded).expect("decode failed").is_empty());
    }

    #[test]
    fn test_index_roundtrip_preserves_order() {
        let index = vec![
            ConversationSummary {
                id: "b".to_string(),
                display_label: "Chat 2".to_string(),
            },
            ConversationSummary {
                id: "a".to_string(),
                display_label: "Chat 1".to_string(),
            },
        ];
        let encoded = encode_index(&index).expect("encode failed");
        assert_eq!(decode_index(&encoded).expect("decode failed"), index);
    }

    #[test]
    fn test_index_encoding_excludes_messages() {
        let index = vec![ConversationSummary {
            id: "a".to_string(),
            display_label: "Chat 1".to_string(),
        }];
        let encoded = encode_index(&index).expect("encode failed");
        assert!(!encoded.contains("messages"));
    }

    #[test]
    fn test_decode_messages_rejects_wrong_shape() {
        let err = decode_messages(r#"[{"type":"prompt","text":"x"}]"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParleyError>(),
            Some(ParleyError::Storage(_))
        ));
    }

    #[test]
    fn test_decode_messages_rejects_unknown_kind() {
        let raw = r#"[{"kind":"system","text":"x","timestamp":"t"}]"#;
        assert!(decode_messages(raw).is_err());
    }

    #[test]
    fn test_decode_messages_rejects_blank_text() {
        let raw = r#"[{"kind":"prompt","text":"   ","timestamp":"t"}]"#;
        let err = decode_messages(raw).unwrap_err();
        assert!(err.to_string().contains("empty text"));
    }

    #[test]
    fn test_decode_index_rejects_garbage() {
        assert!(decode_index("not json").is_err());
        assert!(decode_index(r#"{"id":"a"}"#).is_err());
    }

    #[test]
    fn test_decode_index_rejects_duplicates() {
        let raw = r#"[{"id":"a","display_label":"x"},{"id":"a","display_label":"y"}]"#;
        let err = decode_index(raw).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
