use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;

use discovery_core::{ChatChunk, ChatClient, ChatRequest, ChatStream, DiscoveryError, TokenUsage};

/// One scripted reaction to a request.
#[derive(Debug, Clone)]
pub enum Script {
    /// Stream this reply, then a usage summary.
    Reply(String),
    /// Fail before any output.
    Fail(String),
    /// Stream these fragments, then fail mid-stream.
    FailAfter(Vec<String>, String),
}

/// A chat client that replays queued replies in order.
///
/// Every request is recorded so callers can inspect what was sent. When the
/// queue is empty the default reply is used, or the request fails if none
/// is set.
pub struct ScriptedClient {
    name: String,
    script: Mutex<VecDeque<Script>>,
    default_reply: Option<String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            name: "scripted".to_string(),
            script: Mutex::new(VecDeque::new()),
            default_reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Script::Reply(reply.into()));
        self
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Script::Fail(message.into()));
        self
    }

    pub fn with_failure_after<I, S>(self, fragments: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fragments = fragments.into_iter().map(Into::into).collect();
        self.push(Script::FailAfter(fragments, message.into()));
        self
    }

    /// Reply used once the queue runs dry.
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = Some(reply.into());
        self
    }

    pub fn push(&self, step: Script) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(step);
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Scripted steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn next_step(&self) -> Option<Script> {
        let queued = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        queued.or_else(|| self.default_reply.clone().map(Script::Reply))
    }
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a reply into word-sized fragments, keeping the whitespace.
fn fragments(reply: &str) -> Vec<String> {
    reply.split_inclusive(' ').map(str::to_string).collect()
}

fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

#[async_trait]
impl ChatClient for ScriptedClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream(&self, request: &ChatRequest) -> Result<ChatStream, DiscoveryError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let input_tokens = request.messages.iter().map(|m| word_count(&m.content)).sum();

        match self.next_step() {
            None => Err(DiscoveryError::upstream("scripted client has no reply queued")),
            Some(Script::Fail(message)) => Err(DiscoveryError::upstream(message)),
            Some(Script::Reply(reply)) => {
                let usage = TokenUsage::new(input_tokens, word_count(&reply));
                let mut items: Vec<Result<ChatChunk, DiscoveryError>> =
                    fragments(&reply).into_iter().map(|f| Ok(ChatChunk::Delta(f))).collect();
                items.push(Ok(ChatChunk::Usage(usage)));
                Ok(stream::iter(items).boxed())
            }
            Some(Script::FailAfter(parts, message)) => {
                let mut items: Vec<Result<ChatChunk, DiscoveryError>> =
                    parts.into_iter().map(|f| Ok(ChatChunk::Delta(f))).collect();
                items.push(Err(DiscoveryError::upstream(message)));
                Ok(stream::iter(items).boxed())
            }
        }
    }
}
