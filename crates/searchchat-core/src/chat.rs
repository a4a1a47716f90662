//! Chat message types for conversation history.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System message (instructions).
    System,
    /// User message (input/prompt).
    User,
    /// Assistant message (response).
    Assistant,
}

impl ChatRole {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(ChatRole::System),
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

/// A message in the conversation history.
///
/// Holding one of these means the content is known to be text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of this message.
    pub role: ChatRole,
    /// Message content.
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message.
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }
}

/// Why an untrusted history entry was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The entry is null or not a JSON object.
    NotAnObject,
    /// The entry has no `content` field.
    MissingContent,
    /// `content` is explicitly null.
    NullContent,
    /// `content` is present but not a string.
    NonTextContent,
    /// `role` is missing or not one of system/user/assistant.
    ///
    /// Entries with text content but a role such as "tool" are dropped here,
    /// not forwarded.
    InvalidRole,
}

impl Rejection {
    /// Short reason used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::NotAnObject => "not_an_object",
            Rejection::MissingContent => "missing_content",
            Rejection::NullContent => "null_content",
            Rejection::NonTextContent => "non_text_content",
            Rejection::InvalidRole => "invalid_role",
        }
    }
}

/// A history record as received from the presentation layer.
///
/// Deserializes from any JSON value so that one bad entry cannot fail the
/// whole request; call [`HistoryEntry::validate`] to get a [`ChatMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryEntry(Value);

impl HistoryEntry {
    /// Wrap a raw JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Validate the entry into a [`ChatMessage`] or say why it was rejected.
    pub fn validate(&self) -> Result<ChatMessage, Rejection> {
        let obj = self.0.as_object().ok_or(Rejection::NotAnObject)?;

        let content = match obj.get("content") {
            None => return Err(Rejection::MissingContent),
            Some(Value::Null) => return Err(Rejection::NullContent),
            Some(Value::String(s)) => s,
            Some(_) => return Err(Rejection::NonTextContent),
        };

        let role = obj
            .get("role")
            .and_then(Value::as_str)
            .and_then(ChatRole::parse)
            .ok_or(Rejection::InvalidRole)?;

        Ok(ChatMessage::new(role, content.clone()))
    }
}

impl From<ChatMessage> for HistoryEntry {
    fn from(msg: ChatMessage) -> Self {
        Self(serde_json::json!({
            "role": msg.role.as_str(),
            "content": msg.content,
        }))
    }
}
