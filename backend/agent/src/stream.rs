//! Streamed agent responses.
//!
//! An agent runs in its own task and pushes events into a bounded channel;
//! the consumer reads them as a `Stream`. The channel closing marks the end
//! of the response. A failure arrives as a final `Err` item.

use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use discovery_core::{DiscoveryError, TokenUsage};

/// Events buffered between the agent task and the consumer.
pub(crate) const RESPONSE_BUFFER: usize = 64;

/// One item of an agent response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEvent {
    /// A fragment of the user-visible reply.
    Delta(String),
    /// The conversation was handed to another agent.
    Routed { agent: String, reason: Option<String> },
    /// A reasoning step, not part of the reply text.
    Thought { iteration: u32, text: String },
    /// Token usage of every model call made for this response. Sent last.
    Usage(TokenUsage),
}

pub type ResponseItem = Result<ResponseEvent, DiscoveryError>;

pub struct ResponseStream {
    inner: ReceiverStream<ResponseItem>,
}

impl ResponseStream {
    pub(crate) fn new(rx: mpsc::Receiver<ResponseItem>) -> Self {
        Self {
            inner: ReceiverStream::new(rx),
        }
    }

    /// Drain the stream into the reply text and total usage.
    pub async fn collect_reply(mut self) -> Result<(String, TokenUsage), DiscoveryError> {
        let mut text = String::new();
        let mut usage = TokenUsage::default();
        while let Some(item) = self.next().await {
            match item? {
                ResponseEvent::Delta(d) => text.push_str(&d),
                ResponseEvent::Usage(u) => usage += u,
                ResponseEvent::Routed { .. } | ResponseEvent::Thought { .. } => {}
            }
        }
        Ok((text, usage))
    }
}

impl Stream for ResponseStream {
    type Item = ResponseItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Producer side of a response stream.
pub(crate) struct Emitter {
    tx: mpsc::Sender<ResponseItem>,
    session_id: String,
    usage: Mutex<TokenUsage>,
}

impl Emitter {
    pub(crate) fn channel(session_id: &str) -> (Self, ResponseStream) {
        let (tx, rx) = mpsc::channel(RESPONSE_BUFFER);
        let emitter = Self {
            tx,
            session_id: session_id.to_string(),
            usage: Mutex::new(TokenUsage::default()),
        };
        (emitter, ResponseStream::new(rx))
    }

    pub(crate) fn session_id(&self) -> &str {
        &self.session_id
    }

    /// A send fails only when the consumer is gone.
    pub(crate) async fn send(&self, event: ResponseEvent) -> Result<(), DiscoveryError> {
        self.tx.send(Ok(event)).await.map_err(|_| DiscoveryError::Cancelled)
    }

    pub(crate) async fn delta(&self, text: impl Into<String>) -> Result<(), DiscoveryError> {
        self.send(ResponseEvent::Delta(text.into())).await
    }

    pub(crate) fn add_usage(&self, usage: TokenUsage) {
        let mut total = self.usage.lock().unwrap_or_else(|e| e.into_inner());
        *total += usage;
    }

    pub(crate) async fn finish(self) {
        let usage = *self.usage.lock().unwrap_or_else(|e| e.into_inner());
        if !usage.is_empty() {
            let _ = self.send(ResponseEvent::Usage(usage)).await;
        }
    }

    pub(crate) async fn fail(self, err: DiscoveryError) {
        let _ = self.tx.send(Err(err)).await;
    }
}
