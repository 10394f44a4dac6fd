//! Agent variants and their dispatch.
//!
//! Every agent exposes its system prompts and a streamed `respond`. Routers
//! and supervisors resolve other agents through the registry and run them
//! over the same conversation, so nesting is bounded by
//! [`MAX_DELEGATION_DEPTH`].

use std::sync::{Arc, OnceLock};

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tracing::{debug, info, warn};

use discovery_config::{AgentKind, AgentRoute};
use discovery_core::{ChatChunk, ChatMessage, Conversation, DiscoveryError};
use discovery_logging::{AgentEvent, EventLogger};
use discovery_providers::ModelHandle;

use crate::context::AgentContext;
use crate::react::{next_step, respond_prompt, think_prompt, parse_thought, ReactReply, ReactStep, REACT_INSTRUCTIONS};
use crate::routing::{parse_delegation, parse_route, routing_input, routing_messages, supervisor_prompt, Delegation, END_MARKER};
use crate::stream::{Emitter, ResponseEvent, ResponseStream};

/// Deepest chain of routers/supervisors one turn may go through.
pub const MAX_DELEGATION_DEPTH: usize = 8;

/// Fields every agent has.
#[derive(Debug, Clone)]
pub struct AgentCore {
    pub key: String,
    pub model: String,
    pub temperature: f32,
    handle: OnceLock<Arc<ModelHandle>>,
}

impl AgentCore {
    pub fn new(key: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            key: key.into(),
            model: model.into(),
            temperature,
            handle: OnceLock::new(),
        }
    }

    /// Model handle, fetched from the shared cache on first use.
    fn handle(&self, ctx: &AgentContext) -> Arc<ModelHandle> {
        Arc::clone(
            self.handle
                .get_or_init(|| ctx.clients.handle(&self.model, self.temperature)),
        )
    }
}

/// One persona, optionally with reference documents.
#[derive(Debug, Clone)]
pub struct SingleAgent {
    pub core: AgentCore,
    pub persona: String,
    pub documents: Vec<String>,
}

/// Several personas answering together; document `i` belongs to persona `i`.
#[derive(Debug, Clone)]
pub struct MultiAgent {
    pub core: AgentCore,
    pub personas: Vec<String>,
    pub documents: Vec<String>,
}

/// Routes each turn to one sub-agent chosen by the model.
#[derive(Debug, Clone)]
pub struct GraphAgent {
    pub core: AgentCore,
    pub condition: String,
    pub routes: Vec<AgentRoute>,
}

/// Delegates to workers until it decides to stop.
#[derive(Debug, Clone)]
pub struct SupervisorAgent {
    pub core: AgentCore,
    pub workers: Vec<String>,
    pub delegation_prompt: String,
    pub max_hops: u32,
}

/// Thinks a bounded number of times, then answers.
#[derive(Debug, Clone)]
pub struct ReactAgent {
    pub core: AgentCore,
    pub persona: String,
    pub max_iterations: u32,
}

#[derive(Debug, Clone)]
pub enum Agent {
    Single(SingleAgent),
    Multi(MultiAgent),
    Graph(GraphAgent),
    Supervisor(SupervisorAgent),
    React(ReactAgent),
}

impl Agent {
    pub fn core(&self) -> &AgentCore {
        match self {
            Agent::Single(a) => &a.core,
            Agent::Multi(a) => &a.core,
            Agent::Graph(a) => &a.core,
            Agent::Supervisor(a) => &a.core,
            Agent::React(a) => &a.core,
        }
    }

    pub fn key(&self) -> &str {
        &self.core().key
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            Agent::Single(_) => AgentKind::Single,
            Agent::Multi(_) => AgentKind::Multi,
            Agent::Graph(_) => AgentKind::Graph,
            Agent::Supervisor(_) => AgentKind::Supervisor,
            Agent::React(_) => AgentKind::React,
        }
    }

    /// System messages this agent puts in front of the conversation.
    pub fn system_prompts(&self, ctx: &AgentContext) -> Result<Vec<ChatMessage>, DiscoveryError> {
        match self {
            Agent::Single(a) => ctx.prompts.load(&a.persona, &a.documents),
            Agent::Multi(a) => {
                let mut messages = Vec::new();
                for (i, persona) in a.personas.iter().enumerate() {
                    let documents: Vec<String> = a.documents.get(i).cloned().into_iter().collect();
                    messages.extend(ctx.prompts.load(persona, &documents)?);
                }
                Ok(messages)
            }
            Agent::Graph(_) => Ok(Vec::new()),
            Agent::Supervisor(a) => Ok(vec![ChatMessage::system(a.delegation_prompt.clone())]),
            Agent::React(a) => {
                let mut messages = ctx.prompts.load(&a.persona, &[])?;
                messages.push(ChatMessage::system(REACT_INSTRUCTIONS));
                Ok(messages)
            }
        }
    }

    /// Answer the conversation.
    ///
    /// The agent runs in a spawned task; dropping the returned stream stops
    /// it at its next send.
    pub fn respond(&self, ctx: &Arc<AgentContext>, conversation: &Conversation, session_id: &str) -> ResponseStream {
        let (emitter, stream) = Emitter::channel(session_id);
        let agent = self.clone();
        let ctx = Arc::clone(ctx);
        let turns = conversation.turns().to_vec();

        tokio::spawn(async move {
            let result = agent.run(&ctx, &turns, &emitter, 0).await;
            match result {
                Ok(reply) => {
                    debug!(agent = agent.key(), chars = reply.len(), "Response complete");
                    emitter.finish().await;
                }
                Err(DiscoveryError::Cancelled) => {
                    debug!(agent = agent.key(), "Response consumer went away");
                }
                Err(err) => {
                    warn!(agent = agent.key(), error = %err, "Response failed");
                    emitter.fail(err).await;
                }
            }
        });

        stream
    }

    /// Produce the reply into `out` and return its full text.
    pub(crate) fn run<'a>(
        &'a self,
        ctx: &'a AgentContext,
        turns: &'a [ChatMessage],
        out: &'a Emitter,
        depth: usize,
    ) -> BoxFuture<'a, Result<String, DiscoveryError>> {
        async move {
            if depth > MAX_DELEGATION_DEPTH {
                return Err(DiscoveryError::configuration(format!(
                    "Agent nesting deeper than {MAX_DELEGATION_DEPTH} at '{}'; check the configuration for routing cycles",
                    self.key()
                )));
            }
            match self {
                Agent::Single(_) | Agent::Multi(_) => {
                    let mut messages = self.system_prompts(ctx)?;
                    messages.extend_from_slice(turns);
                    relay(&self.core().handle(ctx), messages, out).await
                }
                Agent::Graph(a) => a.run(ctx, turns, out, depth).await,
                Agent::Supervisor(a) => a.run(ctx, turns, out, depth).await,
                Agent::React(a) => a.run(self, ctx, turns, out).await,
            }
        }
        .boxed()
    }
}

// ---------------------------------------------------------------------------
// Model calls
// ---------------------------------------------------------------------------

/// Stream a completion to the consumer as it arrives.
async fn relay(handle: &ModelHandle, messages: Vec<ChatMessage>, out: &Emitter) -> Result<String, DiscoveryError> {
    let mut stream = handle.client.stream(&handle.request(messages)).await?;
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk? {
            ChatChunk::Delta(delta) => {
                text.push_str(&delta);
                out.delta(delta).await?;
            }
            ChatChunk::Usage(usage) => out.add_usage(usage),
        }
    }
    Ok(text)
}

/// Run a completion the consumer never sees (routing, delegation, thinking).
async fn complete(handle: &ModelHandle, messages: Vec<ChatMessage>, out: &Emitter) -> Result<String, DiscoveryError> {
    let completion = handle.client.complete(&handle.request(messages)).await?;
    if let Some(usage) = completion.usage {
        out.add_usage(usage);
    }
    Ok(completion.content)
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

impl GraphAgent {
    /// Ask the model which agent should answer. The reply is never shown.
    async fn decide(&self, ctx: &AgentContext, turns: &[ChatMessage], out: &Emitter) -> Result<String, DiscoveryError> {
        let messages = routing_messages(&self.condition, routing_input(turns));
        let reply = complete(&self.core.handle(ctx), messages, out).await?;
        Ok(parse_route(&reply))
    }

    async fn run(
        &self,
        ctx: &AgentContext,
        turns: &[ChatMessage],
        out: &Emitter,
        depth: usize,
    ) -> Result<String, DiscoveryError> {
        let decision = self.decide(ctx, turns, out).await?;
        info!(router = %self.core.key, decision = %decision, "Routing decision");
        EventLogger::log_event(
            out.session_id(),
            AgentEvent::Routed {
                router: self.core.key.clone(),
                decision: decision.clone(),
            },
        );

        let Some(agent) = ctx.agent(&decision)? else {
            return Err(DiscoveryError::configuration(format!(
                "Agent '{decision}' not found in registry."
            )));
        };
        let reason = self.trigger(&decision).map(str::to_string);
        out.send(ResponseEvent::Routed {
            agent: decision,
            reason,
        })
        .await?;
        agent.run(ctx, turns, out, depth + 1).await
    }

    /// Trigger description of the route to `key`, if it is one of ours.
    fn trigger(&self, key: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|r| r.agent == key)
            .map(|r| r.condition.as_str())
            .filter(|c| !c.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

impl SupervisorAgent {
    async fn decide(
        &self,
        ctx: &AgentContext,
        working: &[ChatMessage],
        out: &Emitter,
    ) -> Result<Delegation, DiscoveryError> {
        let mut messages = vec![ChatMessage::system(supervisor_prompt(&self.workers, &self.delegation_prompt))];
        messages.extend_from_slice(working);
        let reply = complete(&self.core.handle(ctx), messages, out).await?;
        Ok(parse_delegation(&reply).unwrap_or_else(|err| {
            debug!(supervisor = %self.core.key, error = %err, "Treating unparsable decision as END");
            Delegation {
                worker: END_MARKER.to_string(),
                reason: String::new(),
            }
        }))
    }

    async fn run(
        &self,
        ctx: &AgentContext,
        turns: &[ChatMessage],
        out: &Emitter,
        depth: usize,
    ) -> Result<String, DiscoveryError> {
        let mut working = turns.to_vec();
        let mut reply = String::new();
        let mut hops = 0u32;

        while hops < self.max_hops {
            let decision = self.decide(ctx, &working, out).await?;
            let Some(worker) = decision.target(&self.workers) else {
                debug!(supervisor = %self.core.key, decision = %decision.worker, "Supervisor stops delegating");
                break;
            };
            hops += 1;

            info!(supervisor = %self.core.key, worker = %worker, reason = %decision.reason, hop = hops, "Delegating");
            EventLogger::log_event(
                out.session_id(),
                AgentEvent::Delegated {
                    supervisor: self.core.key.clone(),
                    worker: worker.clone(),
                    reason: decision.reason.clone(),
                    hop: hops,
                },
            );
            out.send(ResponseEvent::Routed {
                agent: worker.clone(),
                reason: Some(decision.reason.clone()),
            })
            .await?;

            if !reply.is_empty() {
                out.delta("\n\n").await?;
                reply.push_str("\n\n");
            }

            let worker_reply = match ctx.agent(worker)? {
                Some(agent) => agent.run(ctx, &working, out, depth + 1).await?,
                None => {
                    warn!(supervisor = %self.core.key, worker = %worker, "Worker agent not found in registry");
                    let message = format!("Error: Worker agent '{worker}' not available.");
                    out.delta(message.clone()).await?;
                    message
                }
            };
            reply.push_str(&worker_reply);
            working.push(ChatMessage::assistant(worker_reply));
        }

        if hops == self.max_hops && hops > 0 {
            info!(supervisor = %self.core.key, max_hops = self.max_hops, "Delegation limit reached");
        }

        // Nobody was delegated to: answer directly.
        if hops == 0 {
            let mut messages = vec![ChatMessage::system(self.delegation_prompt.clone())];
            messages.extend_from_slice(turns);
            return relay(&self.core.handle(ctx), messages, out).await;
        }
        Ok(reply)
    }
}

// ---------------------------------------------------------------------------
// ReAct
// ---------------------------------------------------------------------------

impl ReactAgent {
    async fn run(
        &self,
        agent: &Agent,
        ctx: &AgentContext,
        turns: &[ChatMessage],
        out: &Emitter,
    ) -> Result<String, DiscoveryError> {
        let handle = self.core.handle(ctx);
        let mut base = agent.system_prompts(ctx)?;
        base.extend_from_slice(turns);

        let mut iteration = 0u32;
        let mut thought: Option<String> = None;
        while next_step(iteration, self.max_iterations, false) == ReactStep::Think {
            let mut messages = base.clone();
            messages.push(ChatMessage::system(think_prompt(iteration, self.max_iterations)));
            let reply = complete(&handle, messages, out).await?;
            let text = parse_thought(&reply).unwrap_or_default();
            iteration += 1;

            debug!(agent = %self.core.key, iteration, "ReAct thought");
            EventLogger::log_event(
                out.session_id(),
                AgentEvent::Thought {
                    agent: self.core.key.clone(),
                    iteration,
                    thought: text.clone(),
                },
            );
            out.send(ResponseEvent::Thought {
                iteration,
                text: text.clone(),
            })
            .await?;
            thought = Some(text);
        }

        let mut messages = base;
        messages.push(ChatMessage::system(respond_prompt(thought.as_deref())));
        let reply = complete(&handle, messages, out).await?;
        let composed = ReactReply::parse(&reply).compose();
        out.delta(composed.clone()).await?;
        Ok(composed)
    }
}
