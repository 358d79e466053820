//! Anthropic native provider implementation.
//!
//! Uses Anthropic's Messages API directly (not an OpenAI-compatible proxy).
//!
//! Wire shape differences from the OpenAI adapter:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header required
//! - System prompt as a top-level `system` field, not a message
//! - Streaming via SSE with typed events (`content_block_delta`,
//!   `message_stop`)

use async_trait::async_trait;
use futures::StreamExt;
use rivet_core::error::ProviderError;
use rivet_core::message::{Message, Role};
use rivet_core::provider::{Provider, ProviderRequest, StreamChunk};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic native Messages API provider.
pub struct AnthropicProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "anthropic".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Extract system messages from the message list.
    ///
    /// Anthropic takes the system prompt as a top-level field, not in
    /// messages. All system-role entries (the seeded prompt plus any
    /// tool-result messages) are joined in transcript order.
    fn extract_system(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut non_system: Vec<&Message> = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => system_parts.push(&msg.content),
                _ => non_system.push(msg),
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        (system, non_system)
    }

    /// Convert non-system messages to Anthropic API format.
    fn to_api_messages(messages: &[&Message]) -> Vec<AnthropicMessage> {
        messages
            .iter()
            .map(|msg| AnthropicMessage {
                role: match msg.role {
                    Role::Assistant => "assistant".into(),
                    _ => "user".into(),
                },
                content: msg.content.clone(),
            })
            .collect()
    }

    fn build_body(&self, request: &ProviderRequest, stream: bool) -> serde_json::Value {
        let (system, messages) = Self::extract_system(&request.messages);
        let api_messages = Self::to_api_messages(&messages);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": api_messages,
            "max_tokens": request.max_tokens,
        });

        if let Some(sys) = system {
            body["system"] = serde_json::json!(sys);
        }
        if stream {
            body["stream"] = serde_json::json!(true);
        }

        body
    }

    fn map_status(status: u16) -> Option<ProviderError> {
        match status {
            200 => None,
            429 => Some(ProviderError::RateLimited),
            401 | 403 => Some(ProviderError::AuthenticationFailed(
                "Invalid Anthropic API key".into(),
            )),
            _ => Some(ProviderError::ApiError {
                status_code: status,
                message: String::new(),
            }),
        }
    }

    /// Interpret one decoded SSE `data:` payload.
    fn parse_event(data: &str) -> SseEvent {
        let event: serde_json::Value = match serde_json::from_str(data) {
            Ok(v) => v,
            Err(e) => {
                trace!(error = %e, data = %data, "Ignoring unparseable Anthropic SSE");
                return SseEvent::Ignore;
            }
        };

        match event["type"].as_str().unwrap_or("") {
            "content_block_delta" => {
                let delta = &event["delta"];
                if delta["type"].as_str() == Some("text_delta") {
                    if let Some(text) = delta["text"].as_str() {
                        return SseEvent::Text(text.to_string());
                    }
                }
                SseEvent::Ignore
            }
            "message_stop" => SseEvent::Stop,
            _ => SseEvent::Ignore,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    Text(String),
    Stop,
    Ignore,
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_body(&request, false);

        debug!(provider = "anthropic", model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if let Some(mut err) = Self::map_status(status) {
            if let ProviderError::ApiError { message, .. } = &mut err {
                *message = response.text().await.unwrap_or_default();
                warn!(status, body = %message, "Anthropic API error");
            }
            return Err(err);
        }

        let api_resp: AnthropicResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Anthropic response: {e}"),
            })?;

        Ok(api_resp.text())
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_body(&request, true);

        debug!(provider = "anthropic", model = %request.model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if let Some(mut err) = Self::map_status(status) {
            if let ProviderError::ApiError { message, .. } = &mut err {
                *message = response.text().await.unwrap_or_default();
            }
            return Err(err);
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim_end_matches('\r').to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') || line.starts_with("event: ") {
                        continue;
                    }

                    if let Some(data) = line.strip_prefix("data: ") {
                        let data = data.trim();
                        if data.is_empty() {
                            continue;
                        }

                        match Self::parse_event(data) {
                            SseEvent::Text(text) => {
                                if tx.send(Ok(StreamChunk::text(text))).await.is_err() {
                                    return;
                                }
                            }
                            SseEvent::Stop => {
                                let _ = tx.send(Ok(StreamChunk::done())).await;
                                return;
                            }
                            SseEvent::Ignore => {}
                        }
                    }
                }
            }

            // Stream ended without message_stop
            let _ = tx.send(Ok(StreamChunk::done())).await;
        });

        Ok(rx)
    }
}

// --- Anthropic API types ---

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ResponseContentBlock>,
}

impl AnthropicResponse {
    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ResponseContentBlock::Text { text } => Some(text.as_str()),
                ResponseContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponseContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor() {
        let provider = AnthropicProvider::new("sk-ant-test");
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn constructor_with_base_url() {
        let provider =
            AnthropicProvider::new("sk-ant-test").with_base_url("https://custom.proxy.com/");
        assert_eq!(provider.base_url, "https://custom.proxy.com");
    }

    #[test]
    fn system_extraction_joins_all_system_messages() {
        let messages = vec![
            Message::system("You are helpful"),
            Message::user("Hello"),
            Message::assistant("Hi!", "m"),
            Message::system("[Tool Results]\nsome output"),
        ];

        let (system, non_system) = AnthropicProvider::extract_system(&messages);
        assert_eq!(
            system.as_deref(),
            Some("You are helpful\n\n[Tool Results]\nsome output")
        );
        assert_eq!(non_system.len(), 2);
        assert_eq!(non_system[0].role, Role::User);
        assert_eq!(non_system[1].role, Role::Assistant);
    }

    #[test]
    fn system_extraction_no_system() {
        let messages = vec![Message::user("Hello")];
        let (system, non_system) = AnthropicProvider::extract_system(&messages);
        assert!(system.is_none());
        assert_eq!(non_system.len(), 1);
    }

    #[test]
    fn body_includes_system_field() {
        let provider = AnthropicProvider::new("sk-test");
        let request = ProviderRequest {
            model: "claude-sonnet-4-20250514".into(),
            messages: vec![Message::system("sys prompt"), Message::user("hi")],
            max_tokens: 512,
        };

        let body = provider.build_body(&request, false);
        assert_eq!(body["system"], "sys prompt");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn streaming_body_sets_stream_flag() {
        let provider = AnthropicProvider::new("sk-test");
        let request = ProviderRequest {
            model: "claude-sonnet-4-20250514".into(),
            messages: vec![Message::user("hi")],
            max_tokens: 64,
        };
        let body = provider.build_body(&request, true);
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn parse_text_delta_event() {
        let event = AnthropicProvider::parse_event(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}"#,
        );
        assert_eq!(event, SseEvent::Text("Hello".into()));
    }

    #[test]
    fn parse_message_stop_event() {
        let event = AnthropicProvider::parse_event(r#"{"type":"message_stop"}"#);
        assert_eq!(event, SseEvent::Stop);
    }

    #[test]
    fn non_text_events_ignored() {
        assert_eq!(
            AnthropicProvider::parse_event(r#"{"type":"message_start","message":{}}"#),
            SseEvent::Ignore
        );
        assert_eq!(
            AnthropicProvider::parse_event(
                r#"{"type":"content_block_delta","delta":{"type":"input_json_delta","partial_json":"{"}}"#
            ),
            SseEvent::Ignore
        );
        assert_eq!(AnthropicProvider::parse_event("not json"), SseEvent::Ignore);
    }

    #[test]
    fn status_mapping() {
        assert!(AnthropicProvider::map_status(200).is_none());
        assert!(matches!(
            AnthropicProvider::map_status(429),
            Some(ProviderError::RateLimited)
        ));
        assert!(matches!(
            AnthropicProvider::map_status(401),
            Some(ProviderError::AuthenticationFailed(_))
        ));
        assert!(matches!(
            AnthropicProvider::map_status(500),
            Some(ProviderError::ApiError { status_code: 500, .. })
        ));
    }

    #[test]
    fn parse_complete_response() {
        let resp: AnthropicResponse = serde_json::from_str(
            r#"{
                "id": "msg_01",
                "model": "claude-sonnet-4-20250514",
                "content": [{"type": "text", "text": "Hello!"}],
                "usage": {"input_tokens": 10, "output_tokens": 5}
            }"#,
        )
        .unwrap();
        assert_eq!(resp.text(), "Hello!");
    }

    #[test]
    fn parse_response_skips_non_text_blocks() {
        let resp: AnthropicResponse = serde_json::from_str(
            r#"{
                "content": [
                    {"type": "thinking", "thinking": "hmm"},
                    {"type": "text", "text": "Answer."}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(resp.text(), "Answer.");
    }
}
