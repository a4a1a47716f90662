//! HTTP handler for `POST /api/chat`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{error, info, warn};

use searchchat_core::{ChatRequest, ChatResponse, TurnError, TurnRequest};

use crate::http::error::ApiError;
use crate::state::AppState;

/// POST /api/chat - run one conversation turn.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    json_result: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    // Check if a provider is configured
    let engine = match &state.engine {
        Some(engine) => engine,
        None => {
            error!("Chat requested but OPENAI_API_KEY is not set");
            return Err(ApiError::NotConfigured);
        }
    };

    // Handle JSON parsing errors
    let req = match json_result {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(error = %rejection, "Invalid JSON in request body");
            return Err(ApiError::InvalidJson {
                message: rejection.body_text(),
            });
        }
    };

    info!(
        conversation_id = req.conversation_id.as_ref().map(|id| id.as_str()).unwrap_or("-"),
        history_len = req.conversation_history.len(),
        "Received chat request"
    );

    match engine.run(TurnRequest::from(req)).await {
        Ok(outcome) => Ok(Json(outcome.into())),
        Err(TurnError::Validation(e)) => {
            warn!(error = %e, "Rejected chat request");
            Err(ApiError::Validation(e))
        }
        Err(e) => {
            error!(error = %e, "Chat turn failed");
            Err(e.into())
        }
    }
}
