//! Boundary to the remote model provider.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::shaper::{ProviderReply, ProviderRequest};

/// A remote model that answers one request with one reply.
///
/// Implementations own transport concerns (credentials, model name,
/// timeouts); the turn engine only sees requests and replies.
#[async_trait]
pub trait ResponsesProvider: Send + Sync {
    /// Send one request and wait for the complete reply.
    async fn create_response(&self, request: &ProviderRequest)
        -> Result<ProviderReply, ProviderError>;
}
