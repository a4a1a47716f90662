//! One request/response cycle of a conversation.
//!
//! A turn validates the new message, trims the caller's transcript, asks the
//! provider for an answer and hands back the updated transcript. The engine
//! keeps nothing between turns.

use std::sync::Arc;

use tracing::{error, info, info_span, Instrument};

use crate::api::{ChatRequest, ChatResponse};
use crate::chat::{ChatMessage, HistoryEntry};
use crate::error::{CoreError, TurnError};
use crate::history::{self, DEFAULT_HISTORY_LIMIT};
use crate::ids::{ConversationId, ResponseId, TurnId};
use crate::prompt::SystemPrompt;
use crate::provider::ResponsesProvider;
use crate::shaper::{build_request, extract_answer};
use crate::time_context::UserDateTime;

/// Whether a turn answered with the fallback text is kept in the transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Append fallback turns like any other turn.
    #[default]
    Record,
    /// Leave the transcript untouched when the answer was a fallback.
    Skip,
}

/// Per-deployment turn settings.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Maximum number of transcript messages kept.
    pub history_limit: usize,

    /// Treatment of fallback answers.
    pub fallback_policy: FallbackPolicy,

    /// System instruction builder.
    pub prompt: SystemPrompt,
}

impl TurnConfig {
    /// Smallest limit that can hold one full turn.
    pub const MIN_HISTORY_LIMIT: usize = 2;

    /// Check settings that would break the transcript guarantees.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.history_limit < Self::MIN_HISTORY_LIMIT {
            return Err(CoreError::InvalidConfig(format!(
                "history limit must be at least {}, got {}",
                Self::MIN_HISTORY_LIMIT,
                self.history_limit
            )));
        }
        Ok(())
    }
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            fallback_policy: FallbackPolicy::default(),
            prompt: SystemPrompt::default(),
        }
    }
}

/// Input to one turn.
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    /// The new user message.
    pub message: String,

    /// Caller-owned transcript, not yet validated.
    pub history: Vec<HistoryEntry>,

    /// Identity of the conversation, if already established.
    pub conversation_id: Option<ConversationId>,

    /// The user's clock, if supplied.
    pub user_datetime: Option<UserDateTime>,
}

impl From<ChatRequest> for TurnRequest {
    fn from(req: ChatRequest) -> Self {
        Self {
            message: req.message,
            history: req.conversation_history,
            conversation_id: req.conversation_id,
            user_datetime: req.user_datetime,
        }
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Answer text (real or fallback).
    pub response: String,

    /// Provider correlation id for this turn.
    pub response_id: ResponseId,

    /// Resolved conversation identity.
    pub conversation_id: ConversationId,

    /// Updated transcript for the next turn.
    pub history: Vec<ChatMessage>,

    /// Whether the answer is the fallback text.
    pub fallback: bool,
}

impl From<TurnOutcome> for ChatResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            response: outcome.response,
            response_id: outcome.response_id,
            conversation_id: outcome.conversation_id,
            conversation_history: outcome.history,
        }
    }
}

/// Runs turns against a provider.
#[derive(Clone)]
pub struct TurnEngine {
    provider: Arc<dyn ResponsesProvider>,
    config: TurnConfig,
}

impl TurnEngine {
    /// Create a new engine.
    pub fn new(provider: Arc<dyn ResponsesProvider>, config: TurnConfig) -> Self {
        Self { provider, config }
    }

    /// Get the engine settings.
    pub fn config(&self) -> &TurnConfig {
        &self.config
    }

    /// Run one turn.
    pub async fn run(&self, request: TurnRequest) -> Result<TurnOutcome, TurnError> {
        let turn_id = TurnId::generate();
        let span = info_span!("turn", turn_id = %turn_id);
        self.run_inner(request).instrument(span).await
    }

    async fn run_inner(&self, request: TurnRequest) -> Result<TurnOutcome, TurnError> {
        let TurnRequest {
            message,
            history,
            conversation_id,
            user_datetime,
        } = request;

        if message.trim().is_empty() {
            return Err(CoreError::EmptyMessage.into());
        }

        let limit = self.config.history_limit;
        let received = history.len();
        let history = history::prepare(&history, limit);

        info!(
            received,
            kept = history.len(),
            has_time_context = user_datetime.is_some(),
            "Starting turn"
        );

        let provider_request = build_request(
            &self.config.prompt,
            user_datetime.as_ref(),
            &history,
            &message,
        )?;

        let reply = self
            .provider
            .create_response(&provider_request)
            .await
            .map_err(|e| {
                error!(error = %e, "Provider call failed");
                e
            })?;

        let answer = extract_answer(reply);

        let history = if answer.fallback && self.config.fallback_policy == FallbackPolicy::Skip {
            history
        } else {
            history::append_turn(history, message, answer.text.as_str(), limit)
        };

        let conversation_id = ConversationId::resolve(conversation_id, &answer.response_id);

        info!(
            conversation_id = %conversation_id,
            response_id = %answer.response_id,
            history_len = history.len(),
            fallback = answer.fallback,
            "Turn completed"
        );

        Ok(TurnOutcome {
            response: answer.text,
            response_id: answer.response_id,
            conversation_id,
            history,
            fallback: answer.fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::shaper::{ProviderOutput, ProviderReply, ProviderRequest, FALLBACK_RESPONSE};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider that replays queued results and records every request.
    struct StubProvider {
        replies: Mutex<VecDeque<Result<ProviderReply, ProviderError>>>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl StubProvider {
        fn new(replies: Vec<Result<ProviderReply, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn text(id: &str, text: &str) -> Result<ProviderReply, ProviderError> {
            Ok(ProviderReply {
                id: ResponseId::new(id),
                output: ProviderOutput::Text(text.to_string()),
            })
        }

        fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ResponsesProvider for StubProvider {
        async fn create_response(
            &self,
            request: &ProviderRequest,
        ) -> Result<ProviderReply, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected provider call")
        }
    }

    fn engine(provider: Arc<StubProvider>, config: TurnConfig) -> TurnEngine {
        TurnEngine::new(provider, config)
    }

    fn message(text: &str) -> TurnRequest {
        TurnRequest {
            message: text.to_string(),
            ..TurnRequest::default()
        }
    }

    fn numbered_history(count: usize) -> Vec<HistoryEntry> {
        (0..count)
            .map(|i| {
                let role = if i % 2 == 0 { "user" } else { "assistant" };
                HistoryEntry::new(json!({ "role": role, "content": format!("m{}", i) }))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_first_turn_assigns_identity_from_response() {
        let provider = StubProvider::new(vec![StubProvider::text("resp_a", "Hi there!")]);
        let engine = engine(provider.clone(), TurnConfig::default());

        let outcome = engine.run(message("Hello")).await.unwrap();

        assert_eq!(outcome.response, "Hi there!");
        assert_eq!(outcome.response_id.as_str(), "resp_a");
        assert_eq!(outcome.conversation_id.as_str(), "resp_a");
        assert_eq!(
            outcome.history,
            vec![ChatMessage::user("Hello"), ChatMessage::assistant("Hi there!")]
        );
        assert!(!outcome.fallback);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_message_rejected_without_provider_call() {
        let provider = StubProvider::new(vec![]);
        let engine = engine(provider.clone(), TurnConfig::default());

        for text in ["", "  "] {
            let err = engine.run(message(text)).await.unwrap_err();
            assert_eq!(err, TurnError::Validation(CoreError::EmptyMessage));
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_identity_stable_across_turns() {
        let provider = StubProvider::new(vec![
            StubProvider::text("resp_1", "one"),
            StubProvider::text("resp_2", "two"),
        ]);
        let engine = engine(provider, TurnConfig::default());

        let first = engine.run(message("a")).await.unwrap();
        let second = engine
            .run(TurnRequest {
                message: "b".to_string(),
                history: first.history.iter().cloned().map(HistoryEntry::from).collect(),
                conversation_id: Some(first.conversation_id.clone()),
                user_datetime: None,
            })
            .await
            .unwrap();

        assert_eq!(second.response_id.as_str(), "resp_2");
        assert_eq!(second.conversation_id.as_str(), "resp_1");
        assert_eq!(second.history.len(), 4);
    }

    #[tokio::test]
    async fn test_window_applied_to_51_entries() {
        let provider = StubProvider::new(vec![StubProvider::text("resp_x", "reply")]);
        let engine = engine(provider.clone(), TurnConfig::default());
        let history = numbered_history(51);
        let oldest = history[0].validate().unwrap();

        let outcome = engine
            .run(TurnRequest {
                message: "new".to_string(),
                history,
                ..TurnRequest::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.history.len(), 50);
        assert!(!outcome.history.contains(&oldest));

        // System entry + 50 windowed entries + new user message.
        let sent = provider.requests.lock().unwrap()[0].clone();
        assert_eq!(sent.input.len(), 52);
        assert_eq!(sent.input[1].content, "m1");
    }

    #[tokio::test]
    async fn test_malformed_history_dropped_before_sending() {
        let provider = StubProvider::new(vec![StubProvider::text("resp_x", "ok")]);
        let engine = engine(provider.clone(), TurnConfig::default());

        let outcome = engine
            .run(TurnRequest {
                message: "next".to_string(),
                history: vec![
                    HistoryEntry::new(json!({ "role": "user", "content": "kept" })),
                    HistoryEntry::new(json!({ "role": "assistant", "content": null })),
                    HistoryEntry::new(json!(null)),
                ],
                ..TurnRequest::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.history[0], ChatMessage::user("kept"));
        assert_eq!(outcome.history.len(), 3);
        assert_eq!(provider.requests.lock().unwrap()[0].input.len(), 3);
    }

    #[tokio::test]
    async fn test_time_context_reaches_system_entry() {
        let provider = StubProvider::new(vec![StubProvider::text("resp_x", "ok")]);
        let engine = engine(provider.clone(), TurnConfig::default());

        engine
            .run(TurnRequest {
                message: "who plays tonight?".to_string(),
                user_datetime: Some(UserDateTime {
                    local_date_time: "Monday, October 19, 2026 at 7:00:00 PM -04:00".to_string(),
                    timezone: "America/New_York".to_string(),
                    timestamp: "2026-10-19T23:00:00.000Z".to_string(),
                    unix_timestamp: "1792450800".to_string(),
                }),
                ..TurnRequest::default()
            })
            .await
            .unwrap();

        let sent = provider.requests.lock().unwrap()[0].clone();
        assert!(sent.input[0].content.contains("Timezone: America/New_York"));
        assert!(!sent.input[1].content.contains("America/New_York"));
    }

    #[tokio::test]
    async fn test_fallback_turn_recorded_by_default() {
        let provider = StubProvider::new(vec![Ok(ProviderReply {
            id: ResponseId::new("resp_empty"),
            output: ProviderOutput::Empty,
        })]);
        let engine = engine(provider, TurnConfig::default());

        let outcome = engine.run(message("Hello")).await.unwrap();

        assert_eq!(outcome.response, FALLBACK_RESPONSE);
        assert!(outcome.fallback);
        assert_eq!(outcome.conversation_id.as_str(), "resp_empty");
        assert_eq!(
            outcome.history,
            vec![ChatMessage::user("Hello"), ChatMessage::assistant(FALLBACK_RESPONSE)]
        );
    }

    #[tokio::test]
    async fn test_fallback_turn_skipped_when_configured() {
        let provider = StubProvider::new(vec![Ok(ProviderReply {
            id: ResponseId::new("resp_empty"),
            output: ProviderOutput::Text("  ".to_string()),
        })]);
        let config = TurnConfig {
            fallback_policy: FallbackPolicy::Skip,
            ..TurnConfig::default()
        };
        let engine = engine(provider, config);

        let outcome = engine
            .run(TurnRequest {
                message: "Hello".to_string(),
                history: numbered_history(2),
                ..TurnRequest::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.response, FALLBACK_RESPONSE);
        assert_eq!(outcome.history.len(), 2);
        assert_eq!(outcome.history[1].content, "m1");
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_as_error() {
        let provider = StubProvider::new(vec![Err(ProviderError::Transport(
            "connection reset".to_string(),
        ))]);
        let engine = engine(provider, TurnConfig::default());

        let err = engine.run(message("Hello")).await.unwrap_err();

        assert_eq!(
            err,
            TurnError::Provider(ProviderError::Transport("connection reset".to_string()))
        );
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn test_config_rejects_tiny_limit() {
        let config = TurnConfig {
            history_limit: 1,
            ..TurnConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidConfig(_))));
        assert!(TurnConfig::default().validate().is_ok());
    }
}
