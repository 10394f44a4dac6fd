//! Per-user chat session.
//!
//! The session is the only writer of its conversation. A turn is committed
//! once the agent's stream has ended; a turn that is dropped or fails on
//! configuration leaves the conversation as it was.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use tracing::{error, info, warn};
use uuid::Uuid;

use discovery_core::{guard_user_input, Conversation, DiscoveryError, TokenUsage};
use discovery_logging::{AgentEvent, EventLogger};

use crate::agent::Agent;
use crate::context::AgentContext;
use crate::stream::ResponseEvent;

/// Assistant turn recorded when the model call fails.
pub const FALLBACK_MESSAGE: &str = "An error happened, retry your request.";

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Completed { reply: String, usage: TokenUsage },
    /// The model call failed; the fallback reply was recorded instead.
    Fallback { error: String },
    /// Nothing was recorded.
    Failed(String),
    NoAgent,
}

pub struct ChatSession {
    id: Uuid,
    ctx: Arc<AgentContext>,
    agent: Option<Agent>,
    /// Agents built so far in this session, by key.
    agents: HashMap<String, Agent>,
    conversation: Conversation,
    usage: TokenUsage,
}

impl ChatSession {
    pub fn new(ctx: Arc<AgentContext>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ctx,
            agent: None,
            agents: HashMap::new(),
            conversation: Conversation::new(),
            usage: TokenUsage::default(),
        }
    }

    pub fn with_agent(mut self, key: &str) -> Result<Self, DiscoveryError> {
        self.set_agent(key)?;
        Ok(self)
    }

    /// Make `key` the active agent. History is kept.
    pub fn set_agent(&mut self, key: &str) -> Result<(), DiscoveryError> {
        let agent = match self.agents.get(key) {
            Some(agent) => agent.clone(),
            None => {
                let agent = self
                    .ctx
                    .agent(key)?
                    .ok_or_else(|| DiscoveryError::configuration(format!("Agent '{key}' not found in registry.")))?;
                self.agents.insert(key.to_string(), agent.clone());
                agent
            }
        };
        info!(session = %self.id, agent = key, kind = %agent.kind(), "Active agent set");
        self.agent = Some(agent);
        Ok(())
    }

    /// Drop the history and the active agent.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.agent = None;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn agent_key(&self) -> Option<&str> {
        self.agent.as_ref().map(Agent::key)
    }

    pub fn agent(&self) -> Option<&Agent> {
        self.agent.as_ref()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    /// Run one turn, forwarding every response event to `sink` as it arrives.
    pub async fn send<F>(&mut self, text: &str, mut sink: F) -> TurnOutcome
    where
        F: FnMut(&ResponseEvent),
    {
        let Some(agent) = self.agent.clone() else {
            return TurnOutcome::NoAgent;
        };
        let session_id = self.id.to_string();
        let content = guard_user_input(text);

        let mut pending = self.conversation.clone();
        pending.push_user(content.clone());
        EventLogger::log_event(
            &session_id,
            AgentEvent::Message {
                agent: agent.key().to_string(),
                role: "user".into(),
                content,
            },
        );

        let mut stream = agent.respond(&self.ctx, &pending, &session_id);
        let mut reply = String::new();
        let mut usage = TokenUsage::default();

        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    match &event {
                        ResponseEvent::Delta(delta) => reply.push_str(delta),
                        ResponseEvent::Usage(u) => usage += *u,
                        _ => {}
                    }
                    sink(&event);
                }
                Err(err) if err.is_recoverable() => {
                    warn!(session = %session_id, agent = agent.key(), error = %err, "Model call failed, recording fallback");
                    EventLogger::log_event(
                        &session_id,
                        AgentEvent::Fallback {
                            agent: agent.key().to_string(),
                            error_msg: err.to_string(),
                        },
                    );
                    pending.push_assistant(FALLBACK_MESSAGE);
                    self.conversation = pending;
                    return TurnOutcome::Fallback { error: err.to_string() };
                }
                Err(err) => {
                    error!(session = %session_id, agent = agent.key(), error = %err, "Turn failed");
                    EventLogger::log_event(
                        &session_id,
                        AgentEvent::Error {
                            agent: agent.key().to_string(),
                            error_msg: err.to_string(),
                        },
                    );
                    return TurnOutcome::Failed(err.to_string());
                }
            }
        }

        EventLogger::log_event(
            &session_id,
            AgentEvent::Message {
                agent: agent.key().to_string(),
                role: "assistant".into(),
                content: reply.clone(),
            },
        );
        pending.push_assistant(reply.clone());
        self.conversation = pending;
        self.usage += usage;
        TurnOutcome::Completed { reply, usage }
    }
}
