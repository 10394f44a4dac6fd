//! Discovery agent runtime
//!
//! Agent variants and their dispatch, the agent registry, cached prompt
//! loading, streamed responses, and the per-user chat session that owns the
//! conversation.

pub mod agent;
pub mod context;
pub mod prompt_loader;
pub mod react;
pub mod registry;
pub mod routing;
pub mod session;
pub mod stream;

pub use agent::{Agent, GraphAgent, MultiAgent, ReactAgent, SingleAgent, SupervisorAgent, MAX_DELEGATION_DEPTH};
pub use context::AgentContext;
pub use prompt_loader::{PromptLoader, DEFAULT_GUARDRAILS};
pub use registry::AgentRegistry;
pub use session::{ChatSession, TurnOutcome, FALLBACK_MESSAGE};
pub use stream::{ResponseEvent, ResponseStream};
