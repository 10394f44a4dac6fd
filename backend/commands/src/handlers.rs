/// Built-in command handlers.
///
/// Handlers never touch the session themselves: a command that changes it
/// returns a `SessionAction` for the caller to apply.
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use discovery_config::AgentPage;

use crate::dispatch::{CommandContext, CommandHandler, CommandResponse};
use crate::registry::CommandRegistry;
use crate::types::{CommandInvocation, SessionAction};

/// Reply to a chat message sent before any agent was chosen.
pub const NO_AGENT_SELECTED: &str =
    "❌ No agent selected. Please use `/switch <agent_key>` to select an agent first.\n\nType `/list` to see available agents.";

const LIST_HINT: &str = "Type `/list` to see available agents.";

/// One catalog line: "🤖 **Title** (`key`) [*default*] - subtitle".
fn page_line(page: &AgentPage) -> String {
    format!(
        "{} **{}** (`{}`) {}- {}",
        page.icon,
        page.title,
        page.key,
        if page.default { "[*default*] " } else { "" },
        page.subtitle
    )
}

/// Greeting shown when a session starts.
pub fn welcome_message(user: &str, pages: &[AgentPage], current: Option<&AgentPage>) -> String {
    let agents: Vec<String> = pages.iter().map(page_line).collect();
    let start = match current {
        Some(page) => format!("*Choose an agent or start chatting with the current agent:* **{}**", page.title),
        None => "*Choose an agent to begin your AI Discovery Cards experience!*".to_string(),
    };
    format!(
        "# 🤖 Welcome to AI Discovery Cards Agent\n\n\
         Hello **{user}**!\n\n\
         ## Available Agents:\n\n\
         {}\n\n\
         ## Getting Started:\n\n\
         To switch to an agent, type: `/switch <agent_key>`\n\n\
         For example: `/switch facilitator`\n\n\
         You can also type `/help` for more commands or `/list` to see available agents.\n\n\
         ---\n\
         {start}",
        agents.join("\n")
    )
}

// ---------------------------------------------------------------------------
// /help
// ---------------------------------------------------------------------------

pub struct HelpHandler {
    pub registry: CommandRegistry,
}

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn handle(&self, _ctx: &CommandContext, _inv: &CommandInvocation) -> Result<CommandResponse> {
        let mut lines = vec!["## 🆘 Available Commands:".to_string(), String::new()];
        for cmd in self.registry.all() {
            lines.push(format!("- `{}` - {}", cmd.usage(), cmd.description));
        }
        lines.extend(
            [
                "",
                "## 💡 Tips:",
                "",
                "- Each agent has unique expertise and knowledge",
                "- You can switch between agents anytime during your conversation",
                "- Admin users have access to additional agents",
            ]
            .map(String::from),
        );
        Ok(CommandResponse::ephemeral(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// /list
// ---------------------------------------------------------------------------

pub struct ListHandler;

#[async_trait]
impl CommandHandler for ListHandler {
    async fn handle(&self, ctx: &CommandContext, _inv: &CommandInvocation) -> Result<CommandResponse> {
        if ctx.available.is_empty() {
            return Ok(CommandResponse::ephemeral("❌ No agents available."));
        }
        let agents: Vec<String> = ctx
            .available
            .iter()
            .map(|page| {
                let status = if ctx.current_agent.as_deref() == Some(page.key.as_str()) {
                    "🟢 **ACTIVE**"
                } else {
                    "⚪"
                };
                format!("{status} {} **{}** (`{}`)\n   _{}_", page.icon, page.title, page.key, page.subtitle)
            })
            .collect();
        Ok(CommandResponse::ephemeral(format!(
            "## 🤖 Available Agents:\n\n{}\n\nUse `/switch <agent_key>` to activate an agent.",
            agents.join("\n")
        )))
    }
}

// ---------------------------------------------------------------------------
// /switch
// ---------------------------------------------------------------------------

pub struct SwitchHandler;

#[async_trait]
impl CommandHandler for SwitchHandler {
    async fn handle(&self, ctx: &CommandContext, inv: &CommandInvocation) -> Result<CommandResponse> {
        let Some(key) = inv.args.first() else {
            return Ok(CommandResponse::ephemeral(format!(
                "❌ Usage: `/switch <agent_key>`\n\n{LIST_HINT}"
            )));
        };
        let Some(page) = ctx.page(key) else {
            return Ok(CommandResponse::ephemeral(format!("❌ Agent '{key}' not found.\n\n{LIST_HINT}")));
        };

        info!(session = %ctx.session_id, agent = %key, "Switching agent");
        Ok(CommandResponse::ok(format!(
            "## {} Switched to {}\n\n{}\n\n---\nYou can now start chatting with this agent. Type `/help` for more commands.",
            page.icon, page.title, page.subtitle
        ))
        .with_action(SessionAction::SwitchAgent(key.clone())))
    }
}

// ---------------------------------------------------------------------------
// /current
// ---------------------------------------------------------------------------

pub struct CurrentHandler;

#[async_trait]
impl CommandHandler for CurrentHandler {
    async fn handle(&self, ctx: &CommandContext, _inv: &CommandInvocation) -> Result<CommandResponse> {
        let Some(key) = ctx.current_agent.as_deref() else {
            return Ok(CommandResponse::ephemeral(
                "❌ No agent currently selected. Use `/switch <agent_key>` to select one.",
            ));
        };
        let (icon, title) = match ctx.page(key) {
            Some(page) => (page.icon.as_str(), page.title.as_str()),
            None => ("🤖", key),
        };
        Ok(CommandResponse::ephemeral(format!("## 🟢 Current Agent: {icon} {title}")))
    }
}

// ---------------------------------------------------------------------------
// /clear
// ---------------------------------------------------------------------------

pub struct ClearHandler;

#[async_trait]
impl CommandHandler for ClearHandler {
    async fn handle(&self, ctx: &CommandContext, _inv: &CommandInvocation) -> Result<CommandResponse> {
        info!(session = %ctx.session_id, "Clearing chat history");
        Ok(CommandResponse::ok("🧹 Chat history cleared. Select an agent to continue.")
            .with_action(SessionAction::Clear))
    }
}
