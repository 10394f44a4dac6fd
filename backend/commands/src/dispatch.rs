/// Command dispatch: route detected commands to handlers.
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use discovery_config::AgentPage;

use crate::detection::detect_command;
use crate::registry::CommandRegistry;
use crate::types::{CommandInvocation, SessionAction};

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// Context passed to every command handler.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub session_id: String,
    pub current_agent: Option<String>,
    /// Agent pages visible to the user, in catalog order.
    pub available: Vec<AgentPage>,
}

impl CommandContext {
    pub fn page(&self, key: &str) -> Option<&AgentPage> {
        self.available.iter().find(|p| p.key == key)
    }
}

/// The result returned by a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub text: String,
    pub ephemeral: bool, // only visible to the invoker
    pub action: Option<SessionAction>,
}

impl CommandResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: false, action: None }
    }

    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: true, action: None }
    }

    pub fn with_action(mut self, action: SessionAction) -> Self {
        self.action = Some(action);
        self
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &CommandContext, inv: &CommandInvocation) -> Result<CommandResponse>;
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct CommandDispatcher {
    registry: CommandRegistry,
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandDispatcher {
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry, handlers: HashMap::new() }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn register(&mut self, key: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(key.into(), handler);
    }

    /// Handle `text` when it is a slash command; `None` for ordinary messages.
    pub async fn dispatch_text(&self, ctx: &CommandContext, text: &str) -> Option<Result<CommandResponse>> {
        let inv = detect_command(text, &self.registry)?;
        Some(self.dispatch(ctx, &inv).await)
    }

    pub async fn dispatch(&self, ctx: &CommandContext, inv: &CommandInvocation) -> Result<CommandResponse> {
        if let Some(handler) = self.handlers.get(&inv.key) {
            info!(command = %inv.key, session = %ctx.session_id, "Dispatching command");
            handler.handle(ctx, inv).await
        } else {
            warn!(command = %inv.key, session = %ctx.session_id, "Unknown command");
            Ok(CommandResponse::ephemeral(format!(
                "❌ Unknown command: `/{}`\n\nType `/help` for available commands.",
                inv.key
            )))
        }
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new(CommandRegistry::new())
    }
}
