//! System instruction injected at the head of every request.

use crate::time_context::UserDateTime;

/// Default base instruction.
pub const DEFAULT_BASE_INSTRUCTION: &str = "You are a helpful assistant with web search capabilities. When you need current information, facts, or data that might be outdated in your training, use web search to find up-to-date information.";

/// Default time-context block.
///
/// Placeholders: `{local_date_time}`, `{timezone}`, `{timestamp}`, `{unix_timestamp}`.
pub const DEFAULT_TIME_CONTEXT_TEMPLATE: &str = "IMPORTANT: Current date and time information for the user:
- Local date/time: {local_date_time}
- Timezone: {timezone}
- ISO timestamp: {timestamp}
- Unix timestamp: {unix_timestamp}

When the user asks about \"tonight\", \"today\", \"tomorrow\", etc., use the date/time information above to determine what they mean. For example, if they ask \"who's playing in the NBA tonight?\", use the local date/time to determine which date \"tonight\" refers to, then use web search to find \"NBA games [specific date]\" or \"NBA schedule [specific date]\". Always provide direct answers using web search results - don't ask the user for clarification when you have the date/time information and can search for the answer.";

/// Builder for the system-role entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt {
    /// Instruction sent on every turn.
    pub base_instruction: String,

    /// Block appended only when the user's time context is known.
    pub time_context_template: String,
}

impl SystemPrompt {
    /// Create a prompt with a custom base instruction and the default time block.
    pub fn new(base_instruction: impl Into<String>) -> Self {
        Self {
            base_instruction: base_instruction.into(),
            time_context_template: DEFAULT_TIME_CONTEXT_TEMPLATE.to_string(),
        }
    }

    /// Replace the time-context template.
    pub fn with_time_context_template(mut self, template: impl Into<String>) -> Self {
        self.time_context_template = template.into();
        self
    }

    /// Render the full system instruction.
    pub fn render(&self, time: Option<&UserDateTime>) -> String {
        match time {
            Some(time) => format!(
                "{}\n\n{}",
                self.base_instruction,
                self.render_time_context(time)
            ),
            None => self.base_instruction.clone(),
        }
    }

    fn render_time_context(&self, time: &UserDateTime) -> String {
        self.time_context_template
            .replace("{local_date_time}", &time.local_date_time)
            .replace("{timezone}", &time.timezone)
            .replace("{timestamp}", &time.timestamp)
            .replace("{unix_timestamp}", &time.unix_timestamp)
    }
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_INSTRUCTION)
    }
}
