//! Error types for Parley
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Parley operations
///
/// Covers conversation lookups, durable storage, configuration, and the
/// completion endpoint. Functions return [`Result`], so callers that need to
/// branch on the failure kind use `err.downcast_ref::<ParleyError>()`.
#[derive(Error, Debug)]
pub enum ParleyError {
    /// An operation referenced a conversation id that is not in the index
    #[error("Conversation not found: {0}")]
    NotFound(String),

    /// A message was rejected before it reached storage (e.g. blank text)
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Durable storage failed to write, or returned a record that does not decode
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration-related errors, including a missing API credential
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The completion endpoint answered with a failure or an unusable body
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The completion request never got an HTTP answer (DNS, connect, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for Parley operations
///
/// Uses `anyhow::Error` so context can be attached while still carrying a
/// [`ParleyError`] that callers can downcast to.
pub type Result<T> = anyhow::Result<T>;

/// Returns the [`ParleyError`] inside an `anyhow::Error`, if there is one
pub fn kind_of(error: &anyhow::Error) -> Option<&ParleyError> {
    error.downcast_ref::<ParleyError>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error_display() {
        let error = ParleyError::NotFound("abc123".to_string());
        assert_eq!(error.to_string(), "Conversation not found: abc123");
    }

    #[test]
    fn test_storage_error_display() {
        let error = ParleyError::Storage("quota exceeded".to_string());
        assert_eq!(error.to_string(), "Storage error: quota exceeded");
    }

    #[test]
    fn test_configuration_error_display() {
        let error = ParleyError::Configuration("API key is not set".to_string());
        assert_eq!(error.to_string(), "Configuration error: API key is not set");
    }

    #[test]
    fn test_upstream_error_display() {
        let error = ParleyError::Upstream("status 500".to_string());
        assert_eq!(error.to_string(), "Upstream error: status 500");
    }

    #[test]
    fn test_network_error_display() {
        let error = ParleyError::Network("connection reset".to_string());
        assert_eq!(error.to_string(), "Network error: connection reset");
    }

    #[test]
    fn test_invalid_message_error_display() {
        let error = ParleyError::InvalidMessage("text is empty".to_string());
        assert_eq!(error.to_string(), "Invalid message: text is empty");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ParleyError = io_error.into();
        assert!(matches!(error, ParleyError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: ParleyError = json_error.into();
        assert!(matches!(error, ParleyError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: ParleyError = yaml_error.into();
        assert!(matches!(error, ParleyError::Yaml(_)));
    }

    #[test]
    fn test_kind_of_recovers_variant_through_anyhow() {
        let err: anyhow::Error = ParleyError::NotFound("x".to_string()).into();
        assert!(matches!(kind_of(&err), Some(ParleyError::NotFound(_))));

        let other = anyhow::anyhow!("plain");
        assert!(kind_of(&other).is_none());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParleyError>();
    }
}
