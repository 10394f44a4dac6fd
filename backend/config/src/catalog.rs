//! The page catalog: which agents a user may chat with.

use crate::schema::{PageEntry, PagesConfig};

/// An agent page visible to the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPage {
    pub key: String,
    pub section: String,
    pub title: String,
    pub icon: String,
    pub header: String,
    pub subtitle: String,
    pub default: bool,
}

impl AgentPage {
    fn from_entry(section: &str, key: &str, page: &PageEntry) -> Self {
        Self {
            key: key.to_string(),
            section: section.to_string(),
            title: page.title.clone(),
            icon: page.icon.clone(),
            header: page.header.clone(),
            subtitle: page.subtitle.clone(),
            default: page.default,
        }
    }
}

/// Agent pages visible to the given role, in section then page order.
/// Admin-only pages are hidden from everyone else. When an agent appears on
/// several pages, the first visible one wins.
pub fn available_agents(config: &PagesConfig, is_admin: bool) -> Vec<AgentPage> {
    let mut pages: Vec<AgentPage> = Vec::new();
    for (section, entries) in &config.sections {
        for entry in entries {
            if !entry.is_agent_page() || (entry.admin_only && !is_admin) {
                continue;
            }
            let Some(key) = entry.agent.as_deref().filter(|k| !k.is_empty()) else {
                continue;
            };
            if pages.iter().any(|p| p.key == key) {
                continue;
            }
            pages.push(AgentPage::from_entry(section, key, entry));
        }
    }
    pages
}

/// The agent a new session starts with: the first page flagged `default`.
pub fn default_agent(pages: &[AgentPage]) -> Option<&AgentPage> {
    pages.iter().find(|p| p.default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(agent: &str, admin_only: bool, default: bool) -> PageEntry {
        PageEntry {
            page_type: "agent".into(),
            agent: Some(agent.into()),
            title: agent.to_uppercase(),
            admin_only,
            default,
            ..Default::default()
        }
    }

    fn config() -> PagesConfig {
        let mut cfg = PagesConfig::default();
        cfg.sections.insert(
            "Workshop".into(),
            vec![page("facilitator", true, false), page("customer", false, true)],
        );
        cfg.sections.insert(
            "Research".into(),
            vec![
                page("analyst", false, false),
                PageEntry { page_type: "markdown".into(), ..Default::default() },
            ],
        );
        cfg
    }

    #[test]
    fn admin_sees_admin_only_pages() {
        let keys: Vec<_> = available_agents(&config(), true).into_iter().map(|p| p.key).collect();
        assert_eq!(keys, vec!["analyst", "facilitator", "customer"]);
    }

    #[test]
    fn non_admin_does_not() {
        let pages = available_agents(&config(), false);
        assert!(pages.iter().all(|p| p.key != "facilitator"));
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].section, "Research");
    }

    #[test]
    fn default_page_selects_initial_agent() {
        let pages = available_agents(&config(), false);
        assert_eq!(default_agent(&pages).map(|p| p.key.as_str()), Some("customer"));
        assert!(default_agent(&[]).is_none());
    }
}
