use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Fields the answer payload must carry for a response to count as complete.
pub const EXPECTED_ANSWER_FIELDS: [&str; 2] = ["question", "answer"];

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    #[error("Request body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Missing 'question' field")]
    MissingQuestion,

    #[error("OpenAI API request failed: {0}")]
    Fetch(String),

    #[error("OpenAI API returned an error: {status_code} {status_text}")]
    Upstream {
        status_code: u16,
        status_text: String,
        body: String,
    },

    #[error("Failed to parse OpenAI response: {0}")]
    EnvelopeParse(String),

    #[error("OpenAI response contained no content")]
    NoContent { envelope: Value },

    #[error("AI reply is not valid JSON: {parse_error}")]
    AnswerFormat {
        raw_response: String,
        parse_error: String,
    },

    #[error("AI response is incomplete")]
    IncompleteAnswer { received: Vec<String>, payload: Value },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Wire discriminator carried in the `type` field of every error body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BodyRead(_) => "BODY_READ_ERROR",
            AppError::InvalidJson(_) => "INVALID_JSON",
            AppError::MissingQuestion => "MISSING_FIELD",
            AppError::Fetch(_) => "FETCH_ERROR",
            AppError::Upstream { .. } => "OPENAI_ERROR",
            AppError::EnvelopeParse(_) => "PARSE_ERROR",
            AppError::NoContent { .. } => "NO_CONTENT",
            AppError::AnswerFormat { .. } => "AI_RESPONSE_FORMAT_ERROR",
            AppError::IncompleteAnswer { .. } => "INCOMPLETE_RESPONSE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BodyRead(_) | AppError::InvalidJson(_) | AppError::MissingQuestion => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Network(message) => AppError::Fetch(message),
            ProviderError::UpstreamStatus {
                status_code,
                status_text,
                body,
            } => AppError::Upstream {
                status_code,
                status_text,
                body,
            },
            ProviderError::EnvelopeParse(message) => AppError::EnvelopeParse(message),
            ProviderError::MissingContent { envelope } => AppError::NoContent { envelope },
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let kind = self.kind();

        if status.is_client_error() {
            tracing::warn!(kind, status = status.as_u16(), error = %self, "Request rejected");
        } else {
            tracing::error!(kind, status = status.as_u16(), error = %self, "Request failed");
        }

        let body = match self {
            AppError::BodyRead(details) => json!({
                "error": "Failed to read request body",
                "details": details,
                "type": kind,
            }),
            AppError::InvalidJson(details) => json!({
                "error": "Request body is not valid JSON",
                "details": details,
                "type": kind,
            }),
            AppError::MissingQuestion => json!({
                "error": "Missing 'question' field",
                "type": kind,
            }),
            AppError::Fetch(details) => json!({
                "error": "OpenAI API request failed",
                "details": details,
                "type": kind,
            }),
            AppError::Upstream {
                status_code,
                status_text,
                body,
            } => json!({
                "error": "OpenAI API returned an error",
                "statusCode": status_code,
                "statusText": status_text,
                "details": body,
                "type": kind,
            }),
            AppError::EnvelopeParse(details) => json!({
                "error": "Failed to parse OpenAI response",
                "details": details,
                "type": kind,
            }),
            AppError::NoContent { envelope } => json!({
                "error": "OpenAI response contained no content",
                "openai_response": envelope,
                "type": kind,
            }),
            AppError::AnswerFormat {
                raw_response,
                parse_error,
            } => json!({
                "error": "AI reply is not valid JSON",
                "raw_response": raw_response,
                "parse_error": parse_error,
                "type": kind,
            }),
            AppError::IncompleteAnswer { received, payload } => json!({
                "error": "AI response is incomplete",
                "expected": EXPECTED_ANSWER_FIELDS,
                "received": received,
                "ai_response": payload,
                "type": kind,
            }),
            AppError::Internal(err) => json!({
                "error": "Internal server error",
                "details": err.to_string(),
                "type": kind,
            }),
        };

        (status, Json(body)).into_response()
    }
}
