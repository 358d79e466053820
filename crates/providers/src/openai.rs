//! OpenAI-style chat completions provider.
//!
//! Covers the OpenAI API and the many compatible backends that speak the
//! same shape. Bearer token auth, system messages kept inline in the
//! messages array, streaming via SSE `data:` lines terminated by a
//! literal `[DONE]` sentinel.

use async_trait::async_trait;
use futures::StreamExt;
use rivet_core::error::ProviderError;
use rivet_core::message::{Message, Role};
use rivet_core::provider::{Provider, ProviderRequest, StreamChunk};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-style chat completions provider.
pub struct OpenAiProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "openai".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create with a custom base URL (compatible backends, proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert messages to the chat-completions wire format. All roles stay
    /// inline; system messages are ordinary array entries here.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|msg| ApiMessage {
                role: match msg.role {
                    Role::System => "system".into(),
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                },
                content: msg.content.clone(),
            })
            .collect()
    }

    fn build_body(&self, request: &ProviderRequest, stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "max_tokens": request.max_tokens,
        });
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
                "Invalid OpenAI API key".into(),
            )),
            _ => Some(ProviderError::ApiError {
                status_code: status,
                message: String::new(),
            }),
        }
    }

    /// Interpret one decoded SSE `data:` payload.
    fn parse_data(data: &str) -> SseEvent {
        if data == "[DONE]" {
            return SseEvent::Done;
        }

        let event: serde_json::Value = match serde_json::from_str(data) {
            Ok(v) => v,
            Err(e) => {
                trace!(error = %e, data = %data, "Ignoring unparseable OpenAI SSE");
                return SseEvent::Ignore;
            }
        };

        match event["choices"][0]["delta"]["content"].as_str() {
            Some(text) if !text.is_empty() => SseEvent::Text(text.to_string()),
            _ => SseEvent::Ignore,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    Text(String),
    Done,
    Ignore,
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(&request, false);

        debug!(provider = "openai", model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if let Some(mut err) = Self::map_status(status) {
            if let ProviderError::ApiError { message, .. } = &mut err {
                *message = response.text().await.unwrap_or_default();
                warn!(status, body = %message, "OpenAI API error");
            }
            return Err(err);
        }

        let api_resp: ChatResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse OpenAI response: {e}"),
            })?;

        Ok(api_resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(&request, true);

        debug!(provider = "openai", model = %request.model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
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

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    if let Some(data) = line.strip_prefix("data: ") {
                        match Self::parse_data(data.trim()) {
                            SseEvent::Text(text) => {
                                if tx.send(Ok(StreamChunk::text(text))).await.is_err() {
                                    return;
                                }
                            }
                            SseEvent::Done => {
                                let _ = tx.send(Ok(StreamChunk::done())).await;
                                return;
                            }
                            SseEvent::Ignore => {}
                        }
                    }
                }
            }

            // Stream ended without [DONE]
            let _ = tx.send(Ok(StreamChunk::done())).await;
        });

        Ok(rx)
    }
}

// --- OpenAI API types ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ApiMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor() {
        let provider = OpenAiProvider::new("sk-test");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn constructor_with_base_url() {
        let provider = OpenAiProvider::new("sk-test").with_base_url("http://localhost:8080/v1/");
        assert_eq!(provider.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn system_messages_stay_inline() {
        let messages = vec![
            Message::system("sys"),
            Message::user("hi"),
            Message::assistant("hello", "m"),
            Message::system("[Tool Results]\noutput"),
        ];
        let api = OpenAiProvider::to_api_messages(&messages);
        let roles: Vec<&str> = api.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "system"]);
    }

    #[test]
    fn body_shape() {
        let provider = OpenAiProvider::new("sk-test");
        let request = ProviderRequest {
            model: "gpt-4o".into(),
            messages: vec![Message::user("hi")],
            max_tokens: 256,
        };

        let body = provider.build_body(&request, false);
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 256);
        assert!(body.get("stream").is_none());

        let streaming = provider.build_body(&request, true);
        assert_eq!(streaming["stream"], true);
    }

    #[test]
    fn parse_content_delta() {
        let event = OpenAiProvider::parse_data(
            r#"{"id":"c1","choices":[{"index":0,"delta":{"content":"Hel"}}]}"#,
        );
        assert_eq!(event, SseEvent::Text("Hel".into()));
    }

    #[test]
    fn parse_done_sentinel() {
        assert_eq!(OpenAiProvider::parse_data("[DONE]"), SseEvent::Done);
    }

    #[test]
    fn empty_and_role_deltas_ignored() {
        assert_eq!(
            OpenAiProvider::parse_data(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#),
            SseEvent::Ignore
        );
        assert_eq!(
            OpenAiProvider::parse_data(r#"{"choices":[{"delta":{"content":""}}]}"#),
            SseEvent::Ignore
        );
        assert_eq!(OpenAiProvider::parse_data("garbage"), SseEvent::Ignore);
    }

    #[test]
    fn status_mapping() {
        assert!(OpenAiProvider::map_status(200).is_none());
        assert!(matches!(
            OpenAiProvider::map_status(429),
            Some(ProviderError::RateLimited)
        ));
        assert!(matches!(
            OpenAiProvider::map_status(403),
            Some(ProviderError::AuthenticationFailed(_))
        ));
        assert!(matches!(
            OpenAiProvider::map_status(502),
            Some(ProviderError::ApiError { status_code: 502, .. })
        ));
    }

    #[test]
    fn parse_complete_response() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{
                "id": "chatcmpl-1",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "Hi there!"}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(resp.choices[0].message.content, "Hi there!");
    }
}
