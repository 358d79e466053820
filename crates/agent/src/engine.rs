//! The conversation engine.
//!
//! One `Agent` drives one session: it appends the user's message, streams
//! the assistant's reply, scans the reply for tool tags, executes them, and
//! feeds the results back as a system message for the next round. The
//! driving loop keeps calling [`Agent::stream`] with no user message while
//! tool results keep arriving; a turn with no recognized tool calls returns
//! `None` and hands control back to the operator.

use std::path::Path;
use std::sync::Arc;

use rivet_core::message::{Message, SessionId, Transcript};
use rivet_core::provider::{Provider, ProviderRequest};
use rivet_core::tool::TurnResult;
use rivet_core::Result;
use rivet_tools::ToolSet;
use tokio::sync::mpsc;
use tracing::debug;

use crate::transcript::TranscriptLogger;

/// Prefix of the system message carrying tool output back to the model.
const TOOL_RESULTS_PREFIX: &str = "[Tool Results]";

pub struct Agent {
    session_id: SessionId,
    /// Full `provider/model-name` selector, recorded on assistant messages.
    model: String,
    /// Bare model name sent on provider requests.
    model_name: String,
    provider: Arc<dyn Provider>,
    system_prompt: String,
    transcript: Transcript,
    tools: ToolSet,
    logger: TranscriptLogger,
    max_tokens: u32,
}

impl Agent {
    /// Bind the provider named by `model` and seed a fresh transcript.
    /// Fails fast on a malformed model string or a missing API key.
    pub fn new(
        model: &str,
        session_id: SessionId,
        system_prompt: impl Into<String>,
        tools: ToolSet,
        log_dir: &Path,
        max_tokens: u32,
    ) -> Result<Self> {
        let (provider, model_name) = rivet_providers::bind(model)?;
        Ok(Self::with_provider(
            provider,
            model,
            model_name,
            session_id,
            system_prompt,
            tools,
            log_dir,
            max_tokens,
        ))
    }

    /// Construct with an already-bound provider. Used by tests with mock
    /// providers and by callers that bind out of band.
    #[allow(clippy::too_many_arguments)]
    pub fn with_provider(
        provider: Arc<dyn Provider>,
        model: &str,
        model_name: impl Into<String>,
        session_id: SessionId,
        system_prompt: impl Into<String>,
        tools: ToolSet,
        log_dir: &Path,
        max_tokens: u32,
    ) -> Self {
        let system_prompt = system_prompt.into();
        let logger = TranscriptLogger::new(log_dir, session_id.clone());
        let transcript = Transcript::seeded(session_id.clone(), system_prompt.clone());
        if let Some(seed) = transcript.last() {
            logger.log(seed);
        }

        Self {
            session_id,
            model: model.to_string(),
            model_name: model_name.into(),
            provider,
            system_prompt,
            transcript,
            tools,
            logger,
            max_tokens,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn request(&self) -> ProviderRequest {
        ProviderRequest {
            model: self.model_name.clone(),
            messages: self.transcript.messages.clone(),
            max_tokens: self.max_tokens,
        }
    }

    fn append(&mut self, message: Message) {
        self.logger.log(&message);
        self.transcript.push(message);
    }

    /// One blocking turn: optional user message in, complete reply out,
    /// tools dispatched, results fed back. Returns the newly appended
    /// messages in order.
    pub async fn handle(&mut self, user: Option<&str>) -> Result<Vec<Message>> {
        let before = self.transcript.len();

        if let Some(text) = user {
            self.append(Message::user(text));
        }

        let reply = self.provider.complete(self.request()).await?;
        let assistant = Message::assistant(reply.as_str(), self.model.as_str());
        self.append(assistant);

        if let Some(result) = self.tools.dispatch(&reply).await {
            self.append(Message::system(format!(
                "{TOOL_RESULTS_PREFIX}\n{}",
                result.detail
            )));
        }

        Ok(self.transcript.messages[before..].to_vec())
    }

    /// One streaming turn. Chunks are forwarded to `chunks` as they arrive;
    /// delivery is best-effort — a dropped receiver never corrupts the turn.
    /// The return value is the aggregated tool result of the turn, `None`
    /// when the reply contained no recognized tool calls (the signal for
    /// the driving loop to stop).
    ///
    /// A provider error mid-stream aborts the turn: the partial reply is
    /// discarded and nothing is appended for it.
    pub async fn stream(
        &mut self,
        user: Option<&str>,
        chunks: mpsc::Sender<String>,
    ) -> Result<Option<TurnResult>> {
        if let Some(text) = user {
            self.append(Message::user(text));
        }

        let mut rx = self.provider.stream(self.request()).await?;
        let mut reply = String::new();

        while let Some(item) = rx.recv().await {
            let chunk = item?;
            if let Some(text) = chunk.text {
                reply.push_str(&text);
                let _ = chunks.send(text).await;
            }
            if chunk.done {
                break;
            }
        }

        debug!(chars = reply.len(), "Streamed assistant turn");
        let assistant = Message::assistant(reply.as_str(), self.model.as_str());
        self.append(assistant);

        let result = self.tools.dispatch(&reply).await;
        if let Some(r) = &result {
            self.append(Message::system(format!(
                "{TOOL_RESULTS_PREFIX}\n{}",
                r.detail
            )));
        }

        Ok(result)
    }

    /// Discard the conversation and reseed with the same system prompt,
    /// session id, and provider binding. The fresh seed is logged, so the
    /// transcript file records the reset.
    pub fn clear(&mut self) {
        self.transcript = Transcript::seeded(self.session_id.clone(), self.system_prompt.clone());
        if let Some(seed) = self.transcript.last() {
            self.logger.log(seed);
        }
    }
}
