//! Configuration management for Parley
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ParleyError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Parley
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion endpoint settings
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Where conversations are kept
    #[serde(default)]
    pub storage: StorageConfig,
    /// Interactive chat presentation
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Completion gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Full URL of the chat completions endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; prefer `PARLEY_API_KEY` or `parley auth` over the file
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Upper bound on reply length, in tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout() -> u64 {
    60
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Conversation storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database directory; the platform data directory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Keep conversations in memory only (nothing is written to disk)
    #[serde(default)]
    pub ephemeral: bool,
}

/// Interactive chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Print the timestamp next to each message
    #[serde(default = "default_show_timestamps")]
    pub show_timestamps: bool,

    /// Show the "typing..." indicator while waiting for a reply
    #[serde(default = "default_typing_indicator")]
    pub typing_indicator: bool,
}

fn default_show_timestamps() -> bool {
    true
}

fn default_typing_indicator() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            show_timestamps: default_show_timestamps(),
            typing_indicator: default_typing_indicator(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed. A missing
    /// file is not an error; defaults are used instead.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ParleyError::Configuration(format!("Failed to read config file: {}", e))
        })?;
        serde_yaml::from_str(&contents).map_err(|e| {
            ParleyError::Configuration(format!("Failed to parse config: {}", e)).into()
        })
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_key) = std::env::var("PARLEY_API_KEY") {
            if !api_key.trim().is_empty() {
                self.gateway.api_key = Some(api_key);
            }
        }

        if let Ok(endpoint) = std::env::var("PARLEY_ENDPOINT") {
            self.gateway.endpoint = endpoint;
        }

        if let Ok(model) = std::env::var("PARLEY_MODEL") {
            self.gateway.model = model;
        }

        if let Ok(max_tokens) = std::env::var("PARLEY_MAX_TOKENS") {
            if let Ok(value) = max_tokens.parse() {
                self.gateway.max_tokens = value;
            } else {
                tracing::warn!("Invalid PARLEY_MAX_TOKENS: {}", max_tokens);
            }
        }

        if let Ok(timeout) = std::env::var("PARLEY_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.gateway.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid PARLEY_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(path) = std::env::var("PARLEY_STORAGE_PATH") {
            tracing::debug!(path = %path, "Env override: PARLEY_STORAGE_PATH");
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(path) = &cli.storage_path {
            self.storage.path = Some(path.clone());
        }

        if cli.ephemeral {
            self.storage.ephemeral = true;
        }
    }

    /// Validate the configuration
    ///
    /// A missing API key is not a validation failure: history commands work
    /// without one, and the gateway reports it when a message is sent.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Configuration` if any check fails
    pub fn validate(&self) -> Result<()> {
        let endpoint = url::Url::parse(&self.gateway.endpoint).map_err(|e| {
            ParleyError::Configuration(format!(
                "Invalid gateway.endpoint {}: {}",
                self.gateway.endpoint, e
            ))
        })?;

        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(ParleyError::Configuration(format!(
                "gateway.endpoint must use http or https, got {}",
                endpoint.scheme()
            ))
            .into());
        }

        if self.gateway.model.trim().is_empty() {
            return Err(
                ParleyError::Configuration("gateway.model cannot be empty".to_string()).into(),
            );
        }

        if self.gateway.max_tokens == 0 {
            return Err(ParleyError::Configuration(
                "gateway.max_tokens must be greater than 0".to_string(),
            )
            .into());
        }

        if self.gateway.timeout_seconds == 0 {
            return Err(ParleyError::Configuration(
                "gateway.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
