//! OpenAI-compatible completion gateway
//!
//! Sends each prompt as a single-turn chat completion request and returns the
//! text of the first choice.

use crate::config::GatewayConfig;
use crate::error::{ParleyError, Result};
use crate::providers::{CompletionGateway, CompletionRequest, CompletionResponse};

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Gateway backed by an OpenAI-style `chat/completions` endpoint
///
/// # Examples
///
/// ```no_run
/// use parley::config::GatewayConfig;
/// use parley::providers::{CompletionGateway, OpenAiGateway};
///
/// # async fn example() -> parley::error::Result<()> {
/// let config = GatewayConfig {
///     api_key: Some("sk-...".to_string()),
///     ..GatewayConfig::default()
/// };
/// let gateway = OpenAiGateway::new(config)?;
/// let reply = gateway.complete("Hello!").await?;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
pub struct OpenAiGateway {
    client: Client,
    config: GatewayConfig,
}

impl OpenAiGateway {
    /// Create a new gateway
    ///
    /// A missing API key is accepted here and reported by
    /// [`CompletionGateway::complete`], so history can be browsed without one.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::config::GatewayConfig;
    /// use parley::providers::OpenAiGateway;
    ///
    /// let gateway = OpenAiGateway::new(GatewayConfig::default());
    /// assert!(gateway.is_ok());
    /// ```
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ParleyError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::debug!(
            "Initialized completion gateway: endpoint={}, model={}",
            config.endpoint,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Configured endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Configured model
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Returns true if a non-blank API key is configured
    pub fn has_credential(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[async_trait]
impl CompletionGateway for OpenAiGateway {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key().ok_or_else(|| {
            ParleyError::Configuration(
                "No API key configured. Set PARLEY_API_KEY or run `parley auth`".to_string(),
            )
        })?;

        let request =
            CompletionRequest::single_turn(&self.config.model, prompt, self.config.max_tokens);

        tracing::debug!(
            "Sending completion request: model={}, prompt_chars={}",
            request.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Completion request failed: {}", e);
                ParleyError::Network(format!("Completion request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read completion response body: {}", e);
            ParleyError::Network(format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            tracing::error!("Completion endpoint returned error {}: {}", status, body);
            return Err(ParleyError::Upstream(format!(
                "Endpoint returned error {}: {}",
                status, body
            ))
            .into());
        }

        let parsed: CompletionResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse completion response: {}", e);
            ParleyError::Upstream(format!("Failed to parse response: {}", e))
        })?;

        let reply = parsed.first_content().ok_or_else(|| {
            tracing::error!("Completion response has no choices[0].message.content");
            ParleyError::Upstream("Response is missing choices[0].message.content".to_string())
        })?;

        tracing::debug!("Received reply: {} chars", reply.chars().count());
        Ok(reply.trim().to_string())
    }
}
