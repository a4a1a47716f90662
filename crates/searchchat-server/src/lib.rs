//! SearchChat Server Library
//!
//! This crate provides the HTTP front door for SearchChat: the `/api/chat`
//! endpoint, the OpenAI Responses API provider, and configuration.

pub mod config;
pub mod http;
pub mod provider;
pub mod state;

pub use config::{Config, ConfigError};
pub use provider::OpenAiResponsesClient;
pub use state::AppState;
