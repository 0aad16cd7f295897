//! Chat-completion provider abstraction.
//!
//! The answer pipeline talks to the upstream API through the
//! [`CompletionProvider`] trait so tests can swap in a canned implementation.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("upstream returned {status_code} {status_text}")]
    UpstreamStatus {
        status_code: u16,
        status_text: String,
        body: String,
    },

    #[error("failed to parse upstream envelope: {0}")]
    EnvelopeParse(String),

    #[error("upstream envelope contained no content")]
    MissingContent { envelope: Value },
}

/// Trait for chat-completion providers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send a single question upstream and return the model-authored content
    /// string, still JSON-encoded.
    async fn complete(&self, question: &str) -> Result<String, ProviderError>;
}
