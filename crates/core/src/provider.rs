//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider knows how to send a transcript to an LLM and get text back,
//! either as a complete reply or as a stream of chunks.
//!
//! Implementations: OpenAI-style chat completions, Anthropic Messages API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// A request sent to a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The bare model name (no provider prefix), e.g. "gpt-4o"
    pub model: String,

    /// The full ordered transcript. Adapters reshape this per wire format:
    /// Anthropic pulls system messages out into a top-level field, the
    /// OpenAI shape keeps them inline.
    pub messages: Vec<Message>,

    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

/// A single chunk in a streaming response.
///
/// A stream is a finite, non-restartable sequence of text-bearing chunks
/// followed by exactly one chunk with `done` set. Provider events that carry
/// no text payload are dropped before they get here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Partial content delta.
    #[serde(default)]
    pub text: Option<String>,

    /// Whether this is the final chunk.
    #[serde(default)]
    pub done: bool,
}

impl StreamChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            done: false,
        }
    }

    pub fn done() -> Self {
        Self {
            text: None,
            done: true,
        }
    }
}

/// The core Provider trait.
///
/// The conversation engine calls `complete()` or `stream()` without knowing
/// which backend is bound — pure polymorphism. Neither call retries: a
/// provider error is fatal for the turn and propagates to the caller.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "anthropic").
    fn name(&self) -> &str;

    /// Send a request and get the complete reply text.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<String, ProviderError>;

    /// Send a request and get a stream of text chunks.
    ///
    /// Default implementation calls `complete()` and wraps the result as a
    /// single chunk followed by the terminal chunk.
    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        let text = self.complete(request).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(2);
        let _ = tx.send(Ok(StreamChunk::text(text))).await;
        let _ = tx.send(Ok(StreamChunk::done())).await;
        Ok(rx)
    }
}
