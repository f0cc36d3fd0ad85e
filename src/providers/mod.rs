//! Completion gateways for Parley
//!
//! This module contains the gateway abstraction and the OpenAI-compatible
//! implementation used to answer prompts.

pub mod base;
pub mod openai;

#[cfg(test)]
pub use base::MockCompletionGateway;
pub use base::{ChatMessage, CompletionGateway, CompletionRequest, CompletionResponse};
pub use openai::OpenAiGateway;

use crate::config::GatewayConfig;
use crate::error::Result;

/// Create a gateway instance from configuration
///
/// # Arguments
///
/// * `config` - Gateway configuration, with the API key already resolved
///
/// # Returns
///
/// Returns a boxed gateway instance
///
/// # Errors
///
/// Returns error if initialization fails
pub fn create_gateway(config: &GatewayConfig) -> Result<Box<dyn CompletionGateway>> {
    let gateway = OpenAiGateway::new(config.clone())?;
    if !gateway.has_credential() {
        tracing::warn!(
            "No API key configured for {}; requests will fail until one is set",
            gateway.endpoint()
        );
    }
    Ok(Box::new(gateway))
}
