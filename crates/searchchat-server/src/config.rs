//! Server configuration.

use std::time::Duration;

use searchchat_core::{CoreError, FallbackPolicy, SystemPrompt, TurnConfig, DEFAULT_HISTORY_LIMIT};
use thiserror::Error;

/// Errors in the server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Model name is empty.
    #[error("model name must not be empty")]
    EmptyModel,

    /// Turn settings are invalid.
    #[error(transparent)]
    Turn(#[from] CoreError),

    /// A referenced file could not be read.
    #[error("failed to read '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address.
    pub http_bind_addr: String,

    /// Provider credential. Without it the chat endpoint answers 500.
    pub api_key: Option<String>,

    /// Provider model identifier.
    pub model: String,

    /// Provider API base URL.
    pub api_base_url: String,

    /// Timeout for a single provider call.
    pub request_timeout: Duration,

    /// Maximum number of transcript messages kept.
    pub history_limit: usize,

    /// Treatment of fallback answers.
    pub fallback_policy: FallbackPolicy,

    /// System instruction builder.
    pub prompt: SystemPrompt,
}

impl Config {
    /// Check settings before starting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        self.turn_config().validate()?;
        Ok(())
    }

    /// Turn settings derived from this configuration.
    pub fn turn_config(&self) -> TurnConfig {
        TurnConfig {
            history_limit: self.history_limit,
            fallback_policy: self.fallback_policy,
            prompt: self.prompt.clone(),
        }
    }

    /// Whether a non-blank provider credential is present.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_bind_addr: "127.0.0.1:3000".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            request_timeout: Duration::from_secs(120),
            history_limit: DEFAULT_HISTORY_LIMIT,
            fallback_policy: FallbackPolicy::Record,
            prompt: SystemPrompt::default(),
        }
    }
}
