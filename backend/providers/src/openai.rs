use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use discovery_core::{ChatChunk, ChatClient, ChatMessage, ChatRequest, ChatStream, DiscoveryError, TokenUsage};

use crate::sse::{SseDecoder, SseEvent};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AZURE_API_VERSION: &str = "2025-04-01-preview";

/// Where chat completions are sent and how the request is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// OpenAI or any compatible server (`{base_url}/chat/completions`, bearer auth).
    OpenAi { base_url: String, api_key: String },
    /// Azure OpenAI, where the model name is the deployment name.
    Azure {
        endpoint: String,
        api_key: String,
        api_version: String,
    },
}

impl Endpoint {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::OpenAi {
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn azure(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::Azure {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi { .. } => "openai",
            Self::Azure { .. } => "azure",
        }
    }

    /// Completion URL for `model`.
    pub fn url(&self, model: &str) -> String {
        match self {
            Self::OpenAi { base_url, .. } => {
                format!("{}/chat/completions", base_url.trim_end_matches('/'))
            }
            Self::Azure {
                endpoint,
                api_version,
                ..
            } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint.trim_end_matches('/'),
                model,
                api_version
            ),
        }
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::OpenAi { api_key, .. } => builder.header("Authorization", format!("Bearer {api_key}")),
            Self::Azure { api_key, .. } => builder.header("api-key", api_key),
        }
    }
}

/// Streaming chat completion client.
pub struct OpenAiClient {
    http: Client,
    endpoint: Endpoint,
}

impl OpenAiClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    stream: bool,
    stream_options: StreamOptions,
}

#[derive(Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Deserialize)]
struct WireChunk {
    #[serde(default)]
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    delta: Option<WireDelta>,
}

#[derive(Deserialize)]
struct WireDelta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    total_tokens: Option<u64>,
}

/// Convert one `data:` payload into stream chunks.
///
/// Azure sends an initial chunk with no choices (content filter results);
/// such chunks yield nothing.
pub fn parse_chunk(data: &str) -> Result<Vec<ChatChunk>, DiscoveryError> {
    let chunk: WireChunk = serde_json::from_str(data)
        .map_err(|e| DiscoveryError::upstream(format!("malformed stream chunk: {e}")))?;

    let mut out = Vec::new();
    for choice in chunk.choices {
        if let Some(content) = choice.delta.and_then(|d| d.content) {
            if !content.is_empty() {
                out.push(ChatChunk::Delta(content));
            }
        }
    }
    if let Some(usage) = chunk.usage {
        let mut total = TokenUsage::new(usage.prompt_tokens, usage.completion_tokens);
        if let Some(reported) = usage.total_tokens {
            total.total_tokens = reported;
        }
        out.push(ChatChunk::Usage(total));
    }
    Ok(out)
}

struct DecodeState {
    body: BoxStream<'static, Result<Vec<u8>, String>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<ChatChunk, DiscoveryError>>,
    finished: bool,
}

impl DecodeState {
    fn absorb(&mut self, events: Vec<SseEvent>) {
        for event in events {
            match event {
                SseEvent::Done => {
                    self.finished = true;
                    return;
                }
                SseEvent::Data(data) => match parse_chunk(&data) {
                    Ok(chunks) => self.pending.extend(chunks.into_iter().map(Ok)),
                    Err(err) => {
                        self.pending.push_back(Err(err));
                        self.finished = true;
                        return;
                    }
                },
            }
        }
    }
}

/// Turn a raw SSE byte stream into a chat chunk stream. The first error
/// ends the stream.
pub fn decode_event_stream<S, B, E>(body: S) -> ChatStream
where
    S: futures::Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let state = DecodeState {
        body: body
            .map(|item| item.map(|b| b.as_ref().to_vec()).map_err(|e| e.to_string()))
            .boxed(),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                if item.is_err() {
                    state.pending.clear();
                    state.finished = true;
                }
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(bytes)) => {
                    let events = state.decoder.feed(&bytes);
                    state.absorb(events);
                }
                Some(Err(err)) => {
                    state.finished = true;
                    return Some((
                        Err(DiscoveryError::upstream(format!("stream interrupted: {err}"))),
                        state,
                    ));
                }
                None => {
                    let events = state.decoder.finish();
                    state.absorb(events);
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}

#[async_trait]
impl ChatClient for OpenAiClient {
    fn name(&self) -> &str {
        self.endpoint.name()
    }

    async fn stream(&self, request: &ChatRequest) -> Result<ChatStream, DiscoveryError> {
        let body = WireRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            stream: true,
            stream_options: StreamOptions { include_usage: true },
        };

        debug!(
            backend = self.endpoint.name(),
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .endpoint
            .authorize(self.http.post(self.endpoint.url(&request.model)))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DiscoveryError::upstream(format!("{} request failed: {e}", self.endpoint.name())))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(backend = self.endpoint.name(), %status, "Chat completion rejected");
            return Err(DiscoveryError::upstream(format!(
                "{} returned {}: {}",
                self.endpoint.name(),
                status,
                error_body
            )));
        }

        Ok(decode_event_stream(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(parts: Vec<Result<&'static str, &'static str>>) -> ChatStream {
        decode_event_stream(stream::iter(parts))
    }

    async fn collect(stream: ChatStream) -> Vec<Result<ChatChunk, DiscoveryError>> {
        stream.collect().await
    }

    #[test]
    fn openai_url_and_name() {
        let ep = Endpoint::OpenAi {
            base_url: "http://localhost:8080/v1/".into(),
            api_key: "sk-test".into(),
        };
        assert_eq!(ep.url("gpt-4o"), "http://localhost:8080/v1/chat/completions");
        assert_eq!(ep.name(), "openai");
    }

    #[test]
    fn azure_url_uses_deployment_and_version() {
        let ep = Endpoint::azure("https://example.openai.azure.com/", "key");
        assert_eq!(
            ep.url("gpt-4o"),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2025-04-01-preview"
        );
    }

    #[test]
    fn request_body_asks_for_streamed_usage() {
        let messages = vec![ChatMessage::system("persona"), ChatMessage::user("hi")];
        let body = WireRequest {
            model: "gpt-4o",
            messages: &messages,
            temperature: 0.7,
            stream: true,
            stream_options: StreamOptions { include_usage: true },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], true);
        assert_eq!(json["stream_options"]["include_usage"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn parse_chunk_reads_delta_and_usage() {
        let chunks = parse_chunk(r#"{"choices":[{"delta":{"content":"Hi"}}]}"#).unwrap();
        assert_eq!(chunks, vec![ChatChunk::Delta("Hi".into())]);

        let chunks = parse_chunk(
            r#"{"choices":[],"usage":{"prompt_tokens":12,"completion_tokens":3,"total_tokens":15}}"#,
        )
        .unwrap();
        assert_eq!(chunks, vec![ChatChunk::Usage(TokenUsage::new(12, 3))]);
    }

    #[test]
    fn parse_chunk_skips_filter_only_chunks() {
        let chunks = parse_chunk(r#"{"choices":[],"prompt_filter_results":[]}"#).unwrap();
        assert!(chunks.is_empty());
        assert!(parse_chunk("not json").is_err());
    }

    #[tokio::test]
    async fn decodes_stream_until_done() {
        let items = collect(body(vec![
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n"),
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\ndata: {\"choices\":[],\"usage\":{\"prompt_tokens\":5,\"completion_tokens\":2,\"total_tokens\":7}}\n\n"),
            Ok("data: [DONE]\n\n"),
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n"),
        ]))
        .await;

        let chunks: Vec<ChatChunk> = items.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            chunks,
            vec![
                ChatChunk::Delta("Hel".into()),
                ChatChunk::Delta("lo".into()),
                ChatChunk::Usage(TokenUsage::new(5, 2)),
            ]
        );
    }

    #[tokio::test]
    async fn transport_error_terminates_stream() {
        let items = collect(body(vec![
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n\n"),
            Err("connection reset"),
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\"never\"}}]}\n\n"),
        ]))
        .await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        let err = items[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn malformed_chunk_is_upstream_error() {
        let items = collect(body(vec![Ok("data: {oops\n\n"), Ok("data: [DONE]\n\n")])).await;
        assert_eq!(items.len(), 1);
        assert!(items[0].as_ref().unwrap_err().is_recoverable());
    }
}
