//! OpenAI-compatible chat-completion provider.
//!
//! Sends a fixed system prompt plus the caller's question to the configured
//! completions endpoint and returns the raw content string of the first
//! choice.

use super::{CompletionProvider, ProviderError};
use crate::config::UpstreamConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

/// Sampling temperature fixed by the answer contract.
const TEMPERATURE: f64 = 0.7;

/// Completion token cap fixed by the answer contract.
const MAX_TOKENS: u32 = 500;

/// OpenAI-compatible completion provider.
pub struct OpenAiProvider {
    config: UpstreamConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: UpstreamConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Build the completion request envelope for a question.
    fn build_request<'a>(&'a self, question: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, question: &str) -> Result<String, ProviderError> {
        let request = self.build_request(question);

        tracing::debug!(
            url = %self.config.base_url,
            model = %self.config.model,
            message_count = request.messages.len(),
            question_len = question.len(),
            "Sending request to chat completion API"
        );

        let started = Instant::now();
        let response = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        tracing::info!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chat completion API responded"
        );

        if !status.is_success() {
            let body = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read upstream error body");
                    "<unable to read error details>".to_string()
                }
            };

            return Err(ProviderError::UpstreamStatus {
                status_code: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            });
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::EnvelopeParse(e.to_string()))?;

        tracing::debug!(
            choices = envelope["choices"].as_array().map_or(0, |c| c.len()),
            usage = %envelope["usage"],
            model = %envelope["model"],
            "Parsed chat completion envelope"
        );

        match extract_content(&envelope) {
            Some(content) => {
                tracing::debug!(content = %content, "Raw model reply");
                Ok(content.to_string())
            }
            None => Err(ProviderError::MissingContent { envelope }),
        }
    }
}

/// Pull `choices[0].message.content` out of a completion envelope.
///
/// Empty strings count as missing, as does any non-string value.
fn extract_content(envelope: &Value) -> Option<&str> {
    envelope
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
}

// ============================================================================
// Chat Completion API Request Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}
