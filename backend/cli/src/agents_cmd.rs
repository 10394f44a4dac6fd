//! `discovery agents` and `discovery prompt`.

use anyhow::{Context, Result};

use discovery_config::{available_agents, AgentPage, PagesConfig};
use discovery_core::Role;

use crate::app::App;
use crate::terminal_output::{bold, dim, note_info, render_table, Column};

fn rows(config: &PagesConfig, pages: &[AgentPage]) -> Vec<Vec<String>> {
    pages
        .iter()
        .map(|page| {
            let def = config.agents.get(&page.key);
            vec![
                page.key.clone(),
                def.and_then(|d| d.kind()).map(|k| k.to_string()).unwrap_or_else(|| "?".into()),
                format!("{} {}", page.icon, page.title).trim().to_string(),
                page.section.clone(),
                def.and_then(|d| d.temperature).map(|t| format!("{t:.1}")).unwrap_or_default(),
                if page.default { "yes".into() } else { String::new() },
            ]
        })
        .collect()
}

/// Table of agent pages visible to the role.
pub fn list(app: &App, admin: bool) {
    let pages = available_agents(&app.loaded.pages, admin);
    if pages.is_empty() {
        note_info("No agents available.");
        return;
    }
    let columns = [
        Column::left("Key"),
        Column::left("Kind"),
        Column::left("Title").max_width(40),
        Column::left("Section"),
        Column::right("Temp"),
        Column::left("Default"),
    ];
    print!("{}", render_table(&columns, &rows(&app.loaded.pages, &pages)));
}

/// Print the system prompts an agent would send.
pub fn prompt(app: &App, key: &str) -> Result<()> {
    let agent = app
        .ctx
        .agent(key)?
        .with_context(|| format!("Agent '{key}' not found in registry."))?;
    let messages = agent.system_prompts(&app.ctx)?;
    if messages.is_empty() {
        note_info(&format!("'{key}' is a {} agent and sends no system prompt of its own.", agent.kind()));
        return Ok(());
    }
    for (i, message) in messages.iter().enumerate() {
        println!("{}", bold(&format!("[{}] {}", i + 1, message.role.as_str())));
        println!("{}\n", message.content);
    }
    let system = messages.iter().filter(|m| m.role == Role::System).count();
    println!("{}", dim(&format!("{system} system message(s), {} kind", agent.kind())));
    Ok(())
}
