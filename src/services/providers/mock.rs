//! Mock completion provider for tests.

use super::{CompletionProvider, ProviderError};
use async_trait::async_trait;

enum Reply {
    Content(String),
    NetworkError(String),
    Panic(String),
}

/// Mock provider returning a canned reply for every question.
pub struct MockCompletionProvider {
    reply: Reply,
}

impl MockCompletionProvider {
    /// Provider that answers every question with the given content string.
    pub fn with_content(content: &str) -> Self {
        Self {
            reply: Reply::Content(content.to_string()),
        }
    }

    /// Provider that fails every call with a transport error.
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Reply::NetworkError(message.to_string()),
        }
    }

    /// Provider that panics on every call with the given message.
    pub fn panicking(message: &str) -> Self {
        Self {
            reply: Reply::Panic(message.to_string()),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, _question: &str) -> Result<String, ProviderError> {
        match &self.reply {
            Reply::Content(content) => Ok(content.clone()),
            Reply::NetworkError(message) => Err(ProviderError::Network(message.clone())),
            Reply::Panic(message) => panic!("{}", message),
        }
    }
}
