//! Typed schema for `pages.yaml`: agent definitions plus the page catalog.
//!
//! Field names match the YAML file. Every agent field is optional; which
//! kind of agent a definition describes is derived from the fields present
//! (see [`AgentDefinition::kind`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of the agent/page configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagesConfig {
    /// Agent definitions by key.
    #[serde(default)]
    pub agents: BTreeMap<String, AgentDefinition>,

    /// Catalog sections by name, each an ordered list of pages.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sections: BTreeMap<String, Vec<PageEntry>>,
}

/// What kind of agent a definition builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Single,
    Multi,
    Graph,
    Supervisor,
    React,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Single => "single",
            AgentKind::Multi => "multi",
            AgentKind::Graph => "graph",
            AgentKind::Supervisor => "supervisor",
            AgentKind::React => "react",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One agent entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    // single
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,

    // multi
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personas: Option<Vec<String>>,

    // graph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<AgentRoute>,

    // supervisor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hops: Option<u32>,

    // react
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub react_persona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,
}

impl AgentDefinition {
    /// Kind by field presence, first match wins: `persona`, `personas`,
    /// `condition`, `workers` with `delegation_prompt`, `react_persona`.
    pub fn kind(&self) -> Option<AgentKind> {
        if self.persona.is_some() {
            Some(AgentKind::Single)
        } else if self.personas.is_some() {
            Some(AgentKind::Multi)
        } else if self.condition.is_some() {
            Some(AgentKind::Graph)
        } else if self.workers.is_some() && self.delegation_prompt.is_some() {
            Some(AgentKind::Supervisor)
        } else if self.react_persona.is_some() {
            Some(AgentKind::React)
        } else {
            None
        }
    }

    /// `document` when set, otherwise `documents`, in configured order.
    pub fn document_paths(&self) -> Vec<String> {
        match (&self.document, &self.documents) {
            (Some(doc), _) => vec![doc.clone()],
            (None, Some(docs)) => docs.clone(),
            (None, None) => Vec::new(),
        }
    }
}

/// A graph route: sub-agent key plus the description of when to pick it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRoute {
    pub agent: String,
    #[serde(default)]
    pub condition: String,
}

/// One page of a catalog section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    #[serde(rename = "type")]
    pub page_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub admin_only: bool,
    #[serde(default)]
    pub default: bool,
}

impl PageEntry {
    pub fn is_agent_page(&self) -> bool {
        self.page_type == "agent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
agents:
  facilitator:
    persona: prompts/facilitator.md
    document: prompts/cards.md
  panel:
    personas: [prompts/a.md, prompts/b.md]
    documents: [prompts/da.md]
  router:
    condition: "Reply with the key of the best agent"
    agents:
      - agent: facilitator
        condition: workshop questions
  lead:
    workers: [facilitator, panel]
    delegation_prompt: Delegate carefully
  thinker:
    react_persona: prompts/thinker.md
    max_iterations: 2
sections:
  Workshop:
    - type: agent
      agent: facilitator
      title: Facilitator
      icon: "🧭"
      header: Facilitator
      subtitle: Runs the workshop
      default: true
"#;

    #[test]
    fn parses_every_agent_kind() {
        let config: PagesConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let kind = |key: &str| config.agents[key].kind();
        assert_eq!(kind("facilitator"), Some(AgentKind::Single));
        assert_eq!(kind("panel"), Some(AgentKind::Multi));
        assert_eq!(kind("router"), Some(AgentKind::Graph));
        assert_eq!(kind("lead"), Some(AgentKind::Supervisor));
        assert_eq!(kind("thinker"), Some(AgentKind::React));
        assert_eq!(config.agents["router"].agents[0].agent, "facilitator");
        assert!(config.sections["Workshop"][0].default);
    }

    #[test]
    fn persona_takes_precedence_over_other_fields() {
        let def = AgentDefinition {
            persona: Some("p.md".into()),
            condition: Some("route".into()),
            react_persona: Some("r.md".into()),
            ..Default::default()
        };
        assert_eq!(def.kind(), Some(AgentKind::Single));
    }

    #[test]
    fn workers_without_delegation_prompt_is_not_a_supervisor() {
        let def = AgentDefinition {
            workers: Some(vec!["a".into()]),
            ..Default::default()
        };
        assert_eq!(def.kind(), None);
    }

    #[test]
    fn single_document_wins_over_list() {
        let def = AgentDefinition {
            document: Some("one.md".into()),
            documents: Some(vec!["two.md".into(), "three.md".into()]),
            ..Default::default()
        };
        assert_eq!(def.document_paths(), vec!["one.md".to_string()]);
    }
}
