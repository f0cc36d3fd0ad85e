//! Completion gateway trait and the chat-completions wire types
//!
//! This module defines the [`CompletionGateway`] trait that turns a prompt into
//! a reply, along with the request and response shapes of an OpenAI-style
//! chat completions endpoint.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single message in a completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the sender (always `user` for outgoing prompts)
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Creates a user message
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::providers::ChatMessage;
    ///
    /// let msg = ChatMessage::user("Hello");
    /// assert_eq!(msg.role, "user");
    /// assert_eq!(msg.content, "Hello");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body sent to the completions endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Conversation turns; a single user turn per request
    pub messages: Vec<ChatMessage>,
    /// Upper bound on reply length
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Builds a single-turn request for `prompt`
    pub fn single_turn(model: impl Into<String>, prompt: &str, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens,
        }
    }
}

/// Response body returned by the completions endpoint
///
/// Only the fields Parley reads are modelled; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if the endpoint supplied one
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
    }
}

/// Something that can answer a prompt
///
/// Implementations make at most one attempt per call; retrying is left to the
/// user.
///
/// # Examples
///
/// ```
/// use parley::providers::CompletionGateway;
/// use parley::error::Result;
/// use async_trait::async_trait;
///
/// struct Echo;
///
/// #[async_trait]
/// impl CompletionGateway for Echo {
///     async fn complete(&self, prompt: &str) -> Result<String> {
///         Ok(format!("you said: {}", prompt))
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Send `prompt` and return the trimmed reply text
    ///
    /// # Errors
    ///
    /// - `ParleyError::Configuration` if no credential is configured
    /// - `ParleyError::Upstream` if the endpoint rejects the request or the
    ///   reply has no text
    /// - `ParleyError::Network` if the endpoint cannot be reached
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_turn_request_shape() {
        let request = CompletionRequest::single_turn("gpt-3.5-turbo", "Hello", 500);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "Hello"}],
                "max_tokens": 500
            })
        );
    }

    #[test]
    fn test_first_content_present() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Hi"}}]}"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.first_content(), Some("Hi"));
    }

    #[test]
    fn test_first_content_missing() {
        for body in [
            r#"{}"#,
            r#"{"choices":[]}"#,
            r#"{"choices":[{}]}"#,
            r#"{"choices":[{"message":{"role":"assistant"}}]}"#,
        ] {
            let response: CompletionResponse = serde_json::from_str(body).unwrap();
            assert_eq!(response.first_content(), None, "body: {}", body);
        }
    }
}
