//! Agent definitions by key, and construction of agents from them.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use discovery_config::{AgentDefinition, AgentKind, PagesConfig};
use discovery_config::defaults::{DEFAULT_MAX_HOPS, DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL, DEFAULT_ROUTER_TEMPERATURE, DEFAULT_TEMPERATURE};
use discovery_core::DiscoveryError;

use crate::agent::{Agent, AgentCore, GraphAgent, MultiAgent, ReactAgent, SingleAgent, SupervisorAgent};

/// Read-only set of agent definitions, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    definitions: BTreeMap<String, AgentDefinition>,
}

impl AgentRegistry {
    pub fn new(definitions: BTreeMap<String, AgentDefinition>) -> Self {
        Self { definitions }
    }

    pub fn from_config(config: &PagesConfig) -> Self {
        Self::new(config.agents.clone())
    }

    pub fn get(&self, key: &str) -> Option<&AgentDefinition> {
        self.definitions.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.definitions.contains_key(key)
    }

    /// Build the agent for `key`, or `None` when no such definition exists.
    ///
    /// A definition that matches no agent kind is a configuration error.
    /// Nothing is memoized here; sessions cache the agents they use.
    pub fn get_agent(&self, key: &str) -> Result<Option<Agent>, DiscoveryError> {
        let Some(def) = self.get(key) else {
            warn!(agent = key, "Agent key not found in registry");
            return Ok(None);
        };
        let agent = build_agent(key, def)?;
        debug!(agent = key, kind = %agent.kind(), "Created agent");
        Ok(Some(agent))
    }

    /// All definitions in key order.
    pub fn all(&self) -> impl Iterator<Item = (&str, &AgentDefinition)> {
        self.definitions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn build_agent(key: &str, def: &AgentDefinition) -> Result<Agent, DiscoveryError> {
    let kind = def.kind().ok_or_else(|| {
        DiscoveryError::configuration(format!(
            "Invalid agent configuration for '{key}': missing required configuration fields"
        ))
    })?;

    let default_temperature = match kind {
        AgentKind::Graph => DEFAULT_ROUTER_TEMPERATURE,
        _ => DEFAULT_TEMPERATURE,
    };
    let core = AgentCore::new(
        key,
        def.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        def.temperature.unwrap_or(default_temperature),
    );

    // `kind()` guarantees the fields each arm reads are present.
    let agent = match kind {
        AgentKind::Single => Agent::Single(SingleAgent {
            core,
            persona: def.persona.clone().unwrap_or_default(),
            documents: def.document_paths(),
        }),
        AgentKind::Multi => Agent::Multi(MultiAgent {
            core,
            personas: def.personas.clone().unwrap_or_default(),
            documents: def.document_paths(),
        }),
        AgentKind::Graph => Agent::Graph(GraphAgent {
            core,
            condition: def.condition.clone().unwrap_or_default(),
            routes: def.agents.clone(),
        }),
        AgentKind::Supervisor => Agent::Supervisor(SupervisorAgent {
            core,
            workers: def.workers.clone().unwrap_or_default(),
            delegation_prompt: def.delegation_prompt.clone().unwrap_or_default(),
            max_hops: def.max_hops.unwrap_or(DEFAULT_MAX_HOPS),
        }),
        AgentKind::React => Agent::React(ReactAgent {
            core,
            persona: def.react_persona.clone().unwrap_or_default(),
            max_iterations: def.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
        }),
    };
    Ok(agent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use discovery_config::AgentRoute;

    fn registry() -> AgentRegistry {
        let mut defs = BTreeMap::new();
        defs.insert(
            "facilitator".to_string(),
            AgentDefinition { persona: Some("f.md".into()), document: Some("cards.md".into()), ..Default::default() },
        );
        defs.insert(
            "router".to_string(),
            AgentDefinition {
                condition: Some("pick".into()),
                agents: vec![AgentRoute { agent: "facilitator".into(), condition: "always".into() }],
                ..Default::default()
            },
        );
        defs.insert(
            "lead".to_string(),
            AgentDefinition {
                workers: Some(vec!["facilitator".into()]),
                delegation_prompt: Some("delegate".into()),
                ..Default::default()
            },
        );
        defs.insert("broken".to_string(), AgentDefinition::default());
        AgentRegistry::new(defs)
    }

    #[test]
    fn builds_variant_from_fields() {
        let reg = registry();
        let agent = reg.get_agent("facilitator").unwrap().unwrap();
        assert_eq!(agent.kind(), AgentKind::Single);
        assert_eq!(agent.key(), "facilitator");

        let router = reg.get_agent("router").unwrap().unwrap();
        assert_eq!(router.kind(), AgentKind::Graph);
        assert_eq!(router.core().temperature, 0.7);
        assert_eq!(router.core().model, "gpt-4o");

        match reg.get_agent("lead").unwrap().unwrap() {
            Agent::Supervisor(s) => assert_eq!(s.max_hops, 5),
            other => panic!("unexpected agent {:?}", other.kind()),
        }
    }

    #[test]
    fn unknown_key_is_absent() {
        assert!(registry().get_agent("nobody").unwrap().is_none());
        assert!(registry().get("nobody").is_none());
    }

    #[test]
    fn definition_without_kind_is_configuration_error() {
        let err = registry().get_agent("broken").unwrap_err();
        assert!(matches!(err, DiscoveryError::Configuration(_)));
    }

    #[test]
    fn all_lists_in_key_order() {
        let keys: Vec<_> = registry().all().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["broken", "facilitator", "lead", "router"]);
    }
}
