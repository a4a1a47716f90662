//! Shared application state.

use std::sync::Arc;

use searchchat_core::{ResponsesProvider, TurnConfig, TurnEngine};
use tracing::warn;

use crate::config::Config;
use crate::provider::OpenAiResponsesClient;

/// Shared application state.
///
/// Holds no conversation data; transcripts travel with each request.
pub struct AppState {
    /// Turn engine, absent when no provider credential is configured.
    pub engine: Option<TurnEngine>,
}

impl AppState {
    /// Create state around an already-built engine.
    pub fn new(engine: TurnEngine) -> Arc<Self> {
        Arc::new(Self {
            engine: Some(engine),
        })
    }

    /// Create state with a custom provider.
    pub fn with_provider(provider: Arc<dyn ResponsesProvider>, config: TurnConfig) -> Arc<Self> {
        Self::new(TurnEngine::new(provider, config))
    }

    /// Create state for a server with no provider credential.
    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self { engine: None })
    }

    /// Build state from configuration, wiring the OpenAI provider when a key is present.
    pub fn from_config(config: &Config) -> Arc<Self> {
        match config.api_key.as_deref().filter(|_| config.has_api_key()) {
            Some(api_key) => {
                let client = OpenAiResponsesClient::new(api_key)
                    .with_model(&config.model)
                    .with_base_url(&config.api_base_url)
                    .with_timeout(config.request_timeout);
                Self::with_provider(Arc::new(client), config.turn_config())
            }
            None => {
                warn!("OPENAI_API_KEY is not set - chat requests will fail until it is configured");
                Self::unconfigured()
            }
        }
    }

    /// Whether a provider is configured.
    pub fn is_configured(&self) -> bool {
        self.engine.is_some()
    }
}
