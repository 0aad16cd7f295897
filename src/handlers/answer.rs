//! The answer pipeline: relay a validated question to the completion
//! provider and normalize the model-authored JSON reply.

use crate::error::{AppError, EXPECTED_ANSWER_FIELDS};
use crate::startup::AppState;
use axum::extract::rejection::StringRejection;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::Value;

pub async fn answer(
    State(state): State<AppState>,
    body: Result<String, StringRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body.map_err(|e| AppError::BodyRead(e.to_string()))?;
    tracing::debug!(body = %body, "Raw request body");

    let question = parse_question(&body)?;
    tracing::debug!(question = %question, "Processing question");

    let content = state.provider.complete(&question).await?;

    let payload = parse_answer_payload(&content)?;
    let payload = validate_answer_payload(payload)?;

    tracing::info!("Returning answer");
    Ok(Json(payload))
}

/// Parse the request body and pull out a non-empty `question` string.
fn parse_question(body: &str) -> Result<String, AppError> {
    let data: Value =
        serde_json::from_str(body).map_err(|e| AppError::InvalidJson(e.to_string()))?;

    match data.get("question").and_then(Value::as_str) {
        Some(question) if !question.is_empty() => Ok(question.to_string()),
        _ => Err(AppError::MissingQuestion),
    }
}

/// Parse the model-authored content string, the inner JSON document.
fn parse_answer_payload(content: &str) -> Result<Value, AppError> {
    serde_json::from_str(content).map_err(|e| AppError::AnswerFormat {
        raw_response: content.to_string(),
        parse_error: e.to_string(),
    })
}

/// Require non-empty `question` and `answer` strings on the payload.
///
/// Extra fields are allowed and passed through to the caller untouched.
fn validate_answer_payload(payload: Value) -> Result<Value, AppError> {
    let complete = EXPECTED_ANSWER_FIELDS.iter().all(|field| {
        payload
            .get(field)
            .and_then(Value::as_str)
            .map_or(false, |value| !value.is_empty())
    });

    if complete {
        Ok(payload)
    } else {
        let received = match payload.as_object() {
            Some(map) => map.keys().cloned().collect(),
            None => Vec::new(),
        };
        Err(AppError::IncompleteAnswer { received, payload })
    }
}
