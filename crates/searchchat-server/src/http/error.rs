//! API errors with HTTP status codes and `{ "error": ... }` bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use searchchat_core::{CoreError, ErrorResponse, TurnError};

/// Errors returned by the chat endpoint.
#[derive(Debug)]
pub enum ApiError {
    // Client errors (4xx)
    /// Invalid JSON in request body.
    InvalidJson { message: String },
    /// Request rejected before any provider call.
    Validation(CoreError),

    // Server errors (5xx)
    /// Provider credential missing.
    NotConfigured,
    /// Provider call failed.
    ProviderFailed { message: String },
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson { .. } | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotConfigured | ApiError::ProviderFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Human-readable message placed in the response body.
    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidJson { message } => message.clone(),
            ApiError::Validation(e) => e.to_string(),
            ApiError::NotConfigured => {
                "API key not configured. Please set OPENAI_API_KEY in the server environment"
                    .to_string()
            }
            ApiError::ProviderFailed { message } => {
                format!("Sorry, an error occurred: {}", message)
            }
        }
    }
}

impl From<TurnError> for ApiError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::Validation(e) => ApiError::Validation(e),
            TurnError::Provider(e) => ApiError::ProviderFailed {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
