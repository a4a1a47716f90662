//! SearchChat Core Domain Types
//!
//! This crate contains the conversation logic with no dependencies on:
//! - HTTP servers or clients
//! - Storage of any kind
//! - A concrete model provider
//!
//! The transcript is always owned by the caller and passed by value into
//! and out of each turn; nothing here keeps conversation state between calls.

pub mod api;
pub mod chat;
pub mod error;
pub mod history;
pub mod ids;
pub mod prompt;
pub mod provider;
pub mod shaper;
pub mod time_context;
pub mod turn;

// Re-export commonly used types
pub use api::{ChatRequest, ChatResponse, ErrorResponse};
pub use chat::{ChatMessage, ChatRole, HistoryEntry, Rejection};
pub use error::{CoreError, ProviderError, TurnError};
pub use history::{append_turn, sanitize, window, DEFAULT_HISTORY_LIMIT};
pub use ids::{ConversationId, ResponseId, TurnId};
pub use prompt::SystemPrompt;
pub use provider::ResponsesProvider;
pub use shaper::{
    build_request, extract_answer, ContentPart, HostedTool, OutputItem, ProviderOutput,
    ProviderReply, ProviderRequest, ResolvedAnswer, ToolChoice, FALLBACK_RESPONSE,
};
pub use time_context::UserDateTime;
pub use turn::{FallbackPolicy, TurnConfig, TurnEngine, TurnOutcome, TurnRequest};
