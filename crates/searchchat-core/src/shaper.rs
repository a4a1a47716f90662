//! Outbound request shaping and inbound answer normalization.

use serde::Serialize;
use tracing::warn;

use crate::chat::ChatMessage;
use crate::error::CoreError;
use crate::ids::ResponseId;
use crate::prompt::SystemPrompt;
use crate::time_context::UserDateTime;

/// Answer shown when the provider returns nothing usable.
pub const FALLBACK_RESPONSE: &str =
    "I apologize, but I didn't receive a valid response. Please try again.";

// ============================================================================
// Request
// ============================================================================

/// Hosted tools the provider may run on our behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostedTool {
    /// Provider-side web search.
    WebSearch,
}

/// How the provider should pick tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide.
    Auto,
}

/// Everything the provider needs for one turn, except the model name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderRequest {
    /// System entry, then history oldest first, then the new user message.
    pub input: Vec<ChatMessage>,

    /// Hosted tools to enable.
    pub tools: Vec<HostedTool>,

    /// Tool selection mode.
    pub tool_choice: ToolChoice,

    /// Ask the provider to retain the exchange.
    pub store: bool,
}

/// Assemble the ordered input list for the provider.
///
/// `history` must already be sanitized and windowed.
pub fn build_request(
    prompt: &SystemPrompt,
    time: Option<&UserDateTime>,
    history: &[ChatMessage],
    new_message: &str,
) -> Result<ProviderRequest, CoreError> {
    if new_message.trim().is_empty() {
        return Err(CoreError::EmptyMessage);
    }

    let mut input = Vec::with_capacity(history.len() + 2);
    input.push(ChatMessage::system(prompt.render(time)));
    input.extend(history.iter().cloned());
    input.push(ChatMessage::user(new_message));

    Ok(ProviderRequest {
        input,
        tools: vec![HostedTool::WebSearch],
        tool_choice: ToolChoice::Auto,
        store: true,
    })
}

// ============================================================================
// Response
// ============================================================================

/// One content block of a structured output item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Text produced by the model.
    Text(String),
    /// Anything else (annotations, refusals, images, ...), kept only by kind.
    Other(String),
}

/// One entry of the provider's structured output list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputItem {
    /// Item type as reported by the provider (e.g. "message", "web_search_call").
    pub kind: String,

    /// Content blocks; empty for items that carry none.
    pub content: Vec<ContentPart>,
}

impl OutputItem {
    fn text(&self) -> Option<String> {
        let mut texts = self.content.iter().filter_map(|part| match part {
            ContentPart::Text(text) => Some(text.as_str()),
            ContentPart::Other(_) => None,
        });
        let first = texts.next()?;
        Some(texts.fold(first.to_string(), |mut acc, text| {
            acc.push_str(text);
            acc
        }))
    }
}

/// The two shapes a provider answer can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutput {
    /// Flattened answer text.
    Text(String),
    /// Structured output list.
    Items(Vec<OutputItem>),
    /// Neither was present.
    Empty,
}

impl ProviderOutput {
    /// Resolve to displayable text, or `None` when nothing usable is present.
    pub fn normalize(&self) -> Option<String> {
        let text = match self {
            ProviderOutput::Text(text) => Some(text.clone()),
            ProviderOutput::Items(items) => items
                .iter()
                .find(|item| !item.content.is_empty())
                .and_then(OutputItem::text),
            ProviderOutput::Empty => None,
        };
        text.filter(|t| !t.trim().is_empty())
    }
}

/// Provider answer for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    /// Correlation id assigned by the provider.
    pub id: ResponseId,

    /// Answer payload.
    pub output: ProviderOutput,
}

/// The answer to show the user, after fallback substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnswer {
    /// Real answer text, or [`FALLBACK_RESPONSE`].
    pub text: String,

    /// Provider correlation id for this turn.
    pub response_id: ResponseId,

    /// Whether the fallback text was substituted.
    pub fallback: bool,
}

/// Extract the answer from a provider reply, substituting the fallback text
/// when the reply carries nothing usable.
pub fn extract_answer(reply: ProviderReply) -> ResolvedAnswer {
    match reply.output.normalize() {
        Some(text) => ResolvedAnswer {
            text,
            response_id: reply.id,
            fallback: false,
        },
        None => {
            warn!(response_id = %reply.id, "Empty or null response from provider, using fallback");
            ResolvedAnswer {
                text: FALLBACK_RESPONSE.to_string(),
                response_id: reply.id,
                fallback: true,
            }
        }
    }
}
