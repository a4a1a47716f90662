//! Client-side chat session.
//!
//! The session owns everything the server does not keep: the messages shown
//! to the user, the transcript sent with each turn, and the conversation id.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use searchchat_core::{
    ChatMessage, ChatRequest, ChatResponse, ConversationId, HistoryEntry, UserDateTime,
};

/// A line in the chat view.
pub type DisplayMessage = ChatMessage;

/// State of one conversation as seen by the user.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    messages: Vec<DisplayMessage>,
    history: Vec<ChatMessage>,
    conversation_id: Option<ConversationId>,
    timezone: Option<String>,
}

impl ChatSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report this timezone name instead of the bare UTC offset.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Messages shown so far, oldest first.
    pub fn messages(&self) -> &[DisplayMessage] {
        &self.messages
    }

    /// Transcript to send with the next turn.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Conversation identity, once the server has assigned one.
    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    /// Record a user message and build the request for it.
    ///
    /// Returns `None` for blank input, which is never sent.
    pub fn outgoing<Tz>(&mut self, input: &str, now: &DateTime<Tz>) -> Option<ChatRequest>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::user(text));

        let timezone = self
            .timezone
            .clone()
            .unwrap_or_else(|| now.offset().to_string());

        Some(ChatRequest {
            message: text.to_string(),
            conversation_history: self.history.iter().cloned().map(HistoryEntry::from).collect(),
            conversation_id: self.conversation_id.clone(),
            user_datetime: Some(UserDateTime::capture(now, timezone)),
        })
    }

    /// Apply a successful turn and return the text to display.
    pub fn apply_response(&mut self, response: ChatResponse) -> &str {
        if self.conversation_id.is_none() {
            self.conversation_id = Some(response.conversation_id);
        }
        self.history = response.conversation_history;

        let text = if response.response.is_empty() {
            "No response received".to_string()
        } else {
            response.response
        };
        self.push_assistant(text)
    }

    /// Show a failed turn inline as an assistant message.
    pub fn apply_error(&mut self, error: impl Display) -> &str {
        self.push_assistant(format!("Error: {}", error))
    }

    /// Start a new conversation.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.history.clear();
        self.conversation_id = None;
    }

    fn push_assistant(&mut self, text: String) -> &str {
        self.messages.push(ChatMessage::assistant(text));
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}
