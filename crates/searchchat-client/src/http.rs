//! HTTP client for the SearchChat server.

use tracing::debug;

use searchchat_core::{ChatRequest, ChatResponse, ErrorResponse};

use crate::error::ClientError;

/// HTTP client for the chat API.
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check if the server is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.base_url);
        debug!(url = %url, "Checking health");

        let response = self.inner.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    /// Send one chat turn.
    pub async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(
            url = %url,
            history_len = request.conversation_history.len(),
            "POST request"
        );

        let response = self.inner.post(&url).json(request).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&bytes)
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("Server error: {}", status.as_u16()));
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Serialization(e.to_string()))
    }
}
