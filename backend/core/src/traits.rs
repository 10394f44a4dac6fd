use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::error::DiscoveryError;
use crate::message::ChatMessage;
use crate::types::TokenUsage;

/// Incremental output of a streamed chat completion.
pub type ChatStream = BoxStream<'static, Result<ChatChunk, DiscoveryError>>;

/// Request to a chat completion backend.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

/// One item of a completion stream. `Usage` arrives last, when the
/// backend reports it at all.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatChunk {
    Delta(String),
    Usage(TokenUsage),
}

/// A fully collected completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// Trait for chat completion backends.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Backend name (e.g., "openai", "azure", "scripted").
    fn name(&self) -> &str;

    /// Send the conversation and stream the reply back.
    async fn stream(&self, request: &ChatRequest) -> Result<ChatStream, DiscoveryError>;

    /// Send the conversation and wait for the whole reply.
    async fn complete(&self, request: &ChatRequest) -> Result<Completion, DiscoveryError> {
        let mut stream = self.stream(request).await?;
        let mut completion = Completion::default();
        while let Some(chunk) = stream.next().await {
            match chunk? {
                ChatChunk::Delta(text) => completion.content.push_str(&text),
                ChatChunk::Usage(usage) => completion.usage = Some(usage),
            }
        }
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    struct FixedClient {
        chunks: Vec<Result<ChatChunk, DiscoveryError>>,
    }

    #[async_trait]
    impl ChatClient for FixedClient {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn stream(&self, _request: &ChatRequest) -> Result<ChatStream, DiscoveryError> {
            Ok(stream::iter(self.chunks.clone()).boxed())
        }
    }

    fn request() -> ChatRequest {
        ChatRequest {
            model: "gpt-4o".into(),
            temperature: 1.0,
            messages: vec![ChatMessage::user("hi")],
        }
    }

    #[tokio::test]
    async fn complete_collects_deltas_and_usage() {
        let client = FixedClient {
            chunks: vec![
                Ok(ChatChunk::Delta("Hel".into())),
                Ok(ChatChunk::Delta("lo".into())),
                Ok(ChatChunk::Usage(TokenUsage::new(4, 2))),
            ],
        };
        let completion = client.complete(&request()).await.unwrap();
        assert_eq!(completion.content, "Hello");
        assert_eq!(completion.usage, Some(TokenUsage::new(4, 2)));
    }

    #[tokio::test]
    async fn complete_surfaces_terminal_error() {
        let client = FixedClient {
            chunks: vec![
                Ok(ChatChunk::Delta("partial".into())),
                Err(DiscoveryError::upstream("connection reset")),
            ],
        };
        let err = client.complete(&request()).await.unwrap_err();
        assert!(err.is_recoverable());
    }
}
