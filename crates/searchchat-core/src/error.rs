//! Core domain errors.

use thiserror::Error;

/// Core domain errors for SearchChat.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The new user message is missing or blank.
    #[error("Message is required")]
    EmptyMessage,

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failures talking to the remote model provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("{0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The provider answered with a body we could not decode.
    #[error("invalid provider response: {0}")]
    Decode(String),
}

/// Errors that end a turn without an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    /// Rejected before any provider call.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The provider call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
