//! Config validation: cross-reference checks with user-friendly messages.

use crate::schema::{AgentDefinition, AgentKind, PagesConfig};
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &PagesConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    if config.agents.is_empty() {
        report.warn("agents", "No agents defined");
    }
    for (key, def) in &config.agents {
        validate_agent(config, key, def, &mut report);
    }
    validate_sections(config, &mut report);
    report
}

fn validate_agent(config: &PagesConfig, key: &str, def: &AgentDefinition, report: &mut ValidationReport) {
    let path = format!("agents.{key}");

    let Some(kind) = def.kind() else {
        report.error(
            &path,
            "Missing required fields: expected one of 'persona', 'personas', 'condition', \
             'workers' with 'delegation_prompt', or 'react_persona'",
        );
        return;
    };

    let markers = [
        def.persona.is_some(),
        def.personas.is_some(),
        def.condition.is_some(),
        def.workers.is_some() && def.delegation_prompt.is_some(),
        def.react_persona.is_some(),
    ];
    if markers.iter().filter(|m| **m).count() > 1 {
        report.warn(&path, format!("Fields for several agent kinds present; built as '{kind}'"));
    }

    if let Some(t) = def.temperature {
        if !(0.0..=2.0).contains(&t) {
            report.error(format!("{path}.temperature"), "temperature must be between 0 and 2");
        }
    }

    match kind {
        AgentKind::Single => {
            if def.document.is_some() && def.documents.is_some() {
                report.warn(format!("{path}.documents"), "'document' is set; 'documents' is ignored");
            }
        }
        AgentKind::Multi => {
            let personas = def.personas.as_deref().unwrap_or_default();
            if personas.is_empty() {
                report.error(format!("{path}.personas"), "personas cannot be empty");
            }
            let documents = def.document_paths();
            if documents.len() > personas.len() {
                report.warn(
                    format!("{path}.documents"),
                    "More documents than personas; extra documents are ignored",
                );
            }
        }
        AgentKind::Graph => {
            if def.condition.as_deref().map(str::trim).unwrap_or_default().is_empty() {
                report.error(format!("{path}.condition"), "Routing condition cannot be empty");
            }
            if def.agents.is_empty() {
                report.warn(format!("{path}.agents"), "Router has no sub-agents to route to");
            }
            for (i, route) in def.agents.iter().enumerate() {
                if route.agent == key {
                    report.warn(format!("{path}.agents[{i}].agent"), "Router routes to itself");
                } else if !config.agents.contains_key(&route.agent) {
                    report.error(
                        format!("{path}.agents[{i}].agent"),
                        format!("Unknown agent '{}'", route.agent),
                    );
                }
            }
        }
        AgentKind::Supervisor => {
            let workers = def.workers.as_deref().unwrap_or_default();
            if workers.is_empty() {
                report.error(format!("{path}.workers"), "Supervisor needs at least one worker");
            }
            for (i, worker) in workers.iter().enumerate() {
                if !config.agents.contains_key(worker) {
                    report.warn(
                        format!("{path}.workers[{i}]"),
                        format!("Worker '{worker}' is not defined; delegating to it will report an error"),
                    );
                }
            }
            if def.max_hops == Some(0) {
                report.warn(format!("{path}.max_hops"), "max_hops is 0; the supervisor never delegates");
            }
        }
        AgentKind::React => {}
    }
}

fn validate_sections(config: &PagesConfig, report: &mut ValidationReport) {
    let mut defaults = 0;
    for (section, pages) in &config.sections {
        for (i, page) in pages.iter().enumerate() {
            let path = format!("sections.{section}[{i}]");
            if !page.is_agent_page() {
                continue;
            }
            match page.agent.as_deref() {
                None | Some("") => report.error(format!("{path}.agent"), "Agent page needs an 'agent' key"),
                Some(agent) if !config.agents.contains_key(agent) => {
                    report.error(format!("{path}.agent"), format!("Unknown agent '{agent}'"))
                }
                Some(_) => {}
            }
            if page.default {
                defaults += 1;
            }
        }
    }
    if defaults > 1 {
        report.warn("sections", "More than one default page; the first one wins");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AgentRoute, PageEntry};

    fn single(persona: &str) -> AgentDefinition {
        AgentDefinition { persona: Some(persona.into()), ..Default::default() }
    }

    #[test]
    fn minimal_config_is_valid() {
        let mut cfg = PagesConfig::default();
        cfg.agents.insert("facilitator".into(), single("f.md"));
        let report = validate(&cfg);
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn definition_without_kind_is_error() {
        let mut cfg = PagesConfig::default();
        cfg.agents.insert("broken".into(), AgentDefinition { model: Some("gpt-4o".into()), ..Default::default() });
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "agents.broken");
    }

    #[test]
    fn router_to_unknown_agent_is_error() {
        let mut cfg = PagesConfig::default();
        cfg.agents.insert("a".into(), single("a.md"));
        cfg.agents.insert(
            "router".into(),
            AgentDefinition {
                condition: Some("pick one".into()),
                agents: vec![
                    AgentRoute { agent: "a".into(), condition: "first".into() },
                    AgentRoute { agent: "ghost".into(), condition: "second".into() },
                ],
                ..Default::default()
            },
        );
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].path.ends_with("agents[1].agent"));
    }

    #[test]
    fn unknown_worker_is_only_a_warning() {
        let mut cfg = PagesConfig::default();
        cfg.agents.insert(
            "lead".into(),
            AgentDefinition {
                workers: Some(vec!["ghost".into()]),
                delegation_prompt: Some("delegate".into()),
                ..Default::default()
            },
        );
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.message.contains("ghost")));
    }

    #[test]
    fn agent_page_must_reference_known_agent() {
        let mut cfg = PagesConfig::default();
        cfg.agents.insert("facilitator".into(), single("f.md"));
        cfg.sections.insert(
            "Workshop".into(),
            vec![
                PageEntry { page_type: "agent".into(), agent: Some("facilitator".into()), ..Default::default() },
                PageEntry { page_type: "agent".into(), agent: Some("missing".into()), ..Default::default() },
                PageEntry { page_type: "link".into(), ..Default::default() },
            ],
        );
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "sections.Workshop[1].agent");
    }

    #[test]
    fn temperature_out_of_range_is_error() {
        let mut cfg = PagesConfig::default();
        let mut def = single("f.md");
        def.temperature = Some(3.5);
        cfg.agents.insert("hot".into(), def);
        assert!(!validate(&cfg).is_valid());
    }
}
