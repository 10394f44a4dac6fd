//! Default values applied to agent definitions after loading.

use crate::schema::{AgentDefinition, AgentKind, PagesConfig};

pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Temperature for graph routers, whose decision should be fairly stable.
pub const DEFAULT_ROUTER_TEMPERATURE: f32 = 0.7;

pub const DEFAULT_TEMPERATURE: f32 = 1.0;

pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Delegations a supervisor may make in one turn.
pub const DEFAULT_MAX_HOPS: u32 = 5;

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(mut config: PagesConfig) -> PagesConfig {
    for def in config.agents.values_mut() {
        apply_agent_defaults(def);
    }
    config
}

/// Fill model, temperature and the per-kind loop bounds.
pub fn apply_agent_defaults(def: &mut AgentDefinition) {
    let kind = def.kind();

    if def.model.is_none() {
        def.model = Some(DEFAULT_MODEL.to_string());
    }
    if def.temperature.is_none() {
        def.temperature = Some(match kind {
            Some(AgentKind::Graph) => DEFAULT_ROUTER_TEMPERATURE,
            _ => DEFAULT_TEMPERATURE,
        });
    }
    match kind {
        Some(AgentKind::Supervisor) if def.max_hops.is_none() => {
            def.max_hops = Some(DEFAULT_MAX_HOPS);
        }
        Some(AgentKind::React) if def.max_iterations.is_none() => {
            def.max_iterations = Some(DEFAULT_MAX_ITERATIONS);
        }
        _ => {}
    }
}
