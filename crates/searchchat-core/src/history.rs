//! Sliding-window conversation transcript.
//!
//! The transcript is an ordered list of messages, oldest first, that never
//! includes the injected system instruction. It is bounded to the most
//! recent `limit` entries; older entries are evicted first.

use tracing::debug;

use crate::chat::{ChatMessage, HistoryEntry};

/// Default number of messages kept in the transcript.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Drop entries that are not valid messages, preserving the order of the rest.
pub fn sanitize(entries: &[HistoryEntry]) -> Vec<ChatMessage> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match entry.validate() {
            Ok(msg) => Some(msg),
            Err(reason) => {
                debug!(index, reason = reason.as_str(), "Dropping history entry");
                None
            }
        })
        .collect()
}

/// Keep only the last `limit` messages.
pub fn window(mut history: Vec<ChatMessage>, limit: usize) -> Vec<ChatMessage> {
    if history.len() > limit {
        let excess = history.len() - limit;
        history.drain(..excess);
    }
    history
}

/// Sanitize then window untrusted history in one step.
pub fn prepare(entries: &[HistoryEntry], limit: usize) -> Vec<ChatMessage> {
    window(sanitize(entries), limit)
}

/// Append one turn (user message, then assistant message) and re-apply the window.
///
/// Call exactly once per turn; calling twice records the turn twice.
pub fn append_turn(
    history: Vec<ChatMessage>,
    user_message: impl Into<String>,
    assistant_message: impl Into<String>,
    limit: usize,
) -> Vec<ChatMessage> {
    let mut history = window(history, limit);
    history.push(ChatMessage::user(user_message));
    history.push(ChatMessage::assistant(assistant_message));
    window(history, limit)
}
