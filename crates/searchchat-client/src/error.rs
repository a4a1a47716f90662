//! Error types for the chat client.

use thiserror::Error;

/// Errors that can occur when talking to the SearchChat server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error payload.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
