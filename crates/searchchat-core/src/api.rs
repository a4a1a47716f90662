//! JSON wire types between the presentation layer and the server.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::chat::{ChatMessage, HistoryEntry};
use crate::ids::{ConversationId, ResponseId};
use crate::time_context::UserDateTime;

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The new user turn. Absent decodes as empty and is rejected later.
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,

    /// Prior transcript; untrusted and sanitized by the server. Anything but
    /// an array decodes as empty.
    #[serde(default, deserialize_with = "array_or_empty")]
    pub conversation_history: Vec<HistoryEntry>,

    /// Identity of the conversation, once established.
    #[serde(default)]
    pub conversation_id: Option<ConversationId>,

    /// The user's clock when the message was sent. Undecodable values are dropped.
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub user_datetime: Option<UserDateTime>,
}

/// Response body for a successful turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Answer text (real or fallback).
    pub response: String,

    /// Provider correlation id for this turn.
    pub response_id: ResponseId,

    /// Carried-forward or newly assigned conversation identity.
    pub conversation_id: ConversationId,

    /// Updated, bounded transcript for the next turn.
    pub conversation_history: Vec<ChatMessage>,
}

/// Error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn array_or_empty<'de, D>(deserializer: D) -> Result<Vec<HistoryEntry>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items.into_iter().map(HistoryEntry::new).collect()),
        Value::Null => Ok(Vec::new()),
        other => {
            warn!(kind = json_kind(&other), "Ignoring non-array conversation history");
            Ok(Vec::new())
        }
    }
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<UserDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => match serde_json::from_value(value) {
            Ok(time) => Ok(Some(time)),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed user_datetime");
                Ok(None)
            }
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
