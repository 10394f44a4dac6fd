use std::sync::Arc;

use discovery_core::{ChatClient, DiscoveryError};
use discovery_providers::ClientCache;

use crate::agent::Agent;
use crate::prompt_loader::PromptLoader;
use crate::registry::AgentRegistry;

/// Everything agents share across sessions. Built once at startup and
/// handed around as `Arc<AgentContext>`; read-only afterwards.
pub struct AgentContext {
    pub registry: AgentRegistry,
    pub prompts: PromptLoader,
    pub clients: ClientCache,
}

impl AgentContext {
    pub fn new(registry: AgentRegistry, prompts: PromptLoader, client: Arc<dyn ChatClient>) -> Self {
        Self {
            registry,
            prompts,
            clients: ClientCache::new(client),
        }
    }

    /// Resolve a sub-agent by key.
    pub fn agent(&self, key: &str) -> Result<Option<Agent>, DiscoveryError> {
        self.registry.get_agent(key)
    }
}
