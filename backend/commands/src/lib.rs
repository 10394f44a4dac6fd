pub mod detection;
pub mod dispatch;
pub mod handlers;
pub mod registry;
pub mod types;

use std::sync::Arc;

pub use detection::detect_command;
pub use dispatch::{CommandContext, CommandDispatcher, CommandHandler, CommandResponse};
pub use handlers::{
    welcome_message, ClearHandler, CurrentHandler, HelpHandler, ListHandler, SwitchHandler, NO_AGENT_SELECTED,
};
pub use registry::{builtin_commands, CommandRegistry};
pub use types::{CommandArg, CommandDef, CommandInvocation, SessionAction};

/// Build a dispatcher pre-wired with all built-in handlers.
pub fn build_default_dispatcher() -> CommandDispatcher {
    let registry = CommandRegistry::new();
    let mut dispatcher = CommandDispatcher::new(registry.clone());

    dispatcher.register("help", Arc::new(HelpHandler { registry }));
    dispatcher.register("list", Arc::new(ListHandler));
    dispatcher.register("switch", Arc::new(SwitchHandler));
    dispatcher.register("current", Arc::new(CurrentHandler));
    dispatcher.register("clear", Arc::new(ClearHandler));

    dispatcher
}

#[cfg(test)]
mod tests {
    use super::*;
    use discovery_config::AgentPage;

    fn page(key: &str, default: bool) -> AgentPage {
        AgentPage {
            key: key.into(),
            section: "Workshop".into(),
            title: format!("{key} title"),
            icon: "🧭".into(),
            header: String::new(),
            subtitle: format!("{key} subtitle"),
            default,
        }
    }

    fn ctx(current: Option<&str>) -> CommandContext {
        CommandContext {
            session_id: "s1".into(),
            current_agent: current.map(String::from),
            available: vec![page("facilitator", true), page("customer", false)],
        }
    }

    async fn run(ctx: &CommandContext, text: &str) -> CommandResponse {
        build_default_dispatcher().dispatch_text(ctx, text).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn ordinary_text_is_not_dispatched() {
        assert!(build_default_dispatcher().dispatch_text(&ctx(None), "hello").await.is_none());
    }

    #[tokio::test]
    async fn help_lists_every_command() {
        let resp = run(&ctx(None), "/help").await;
        assert!(resp.text.starts_with("## 🆘 Available Commands:"));
        assert!(resp.text.contains("- `/switch <agent_key>` - Switch to a specific agent"));
        assert!(resp.text.contains("- `/clear` - Clear chat history"));
        assert!(resp.action.is_none());
    }

    #[tokio::test]
    async fn list_marks_active_agent() {
        let resp = run(&ctx(Some("customer")), "/list").await;
        assert!(resp.text.contains("⚪ 🧭 **facilitator title** (`facilitator`)\n   _facilitator subtitle_"));
        assert!(resp.text.contains("🟢 **ACTIVE** 🧭 **customer title** (`customer`)"));

        let empty = CommandContext { available: vec![], ..ctx(None) };
        assert_eq!(run(&empty, "/list").await.text, "❌ No agents available.");
    }

    #[tokio::test]
    async fn switch_only_accepts_available_agents() {
        let resp = run(&ctx(None), "/switch customer").await;
        assert_eq!(resp.action, Some(SessionAction::SwitchAgent("customer".into())));
        assert!(resp.text.starts_with("## 🧭 Switched to customer title"));

        let resp = run(&ctx(None), "/switch admin_tool").await;
        assert!(resp.action.is_none());
        assert!(resp.text.starts_with("❌ Agent 'admin_tool' not found."));

        let resp = run(&ctx(None), "/switch").await;
        assert!(resp.text.starts_with("❌ Usage: `/switch <agent_key>`"));
    }

    #[tokio::test]
    async fn current_reports_selection() {
        assert!(run(&ctx(None), "/current").await.text.starts_with("❌ No agent currently selected."));
        assert_eq!(
            run(&ctx(Some("facilitator")), "/current").await.text,
            "## 🟢 Current Agent: 🧭 facilitator title"
        );
    }

    #[tokio::test]
    async fn clear_requests_session_reset() {
        let resp = run(&ctx(Some("facilitator")), "/clear").await;
        assert_eq!(resp.action, Some(SessionAction::Clear));
        assert_eq!(resp.text, "🧹 Chat history cleared. Select an agent to continue.");
    }

    #[tokio::test]
    async fn unknown_command_is_an_error_reply() {
        let resp = run(&ctx(None), "/dance").await;
        assert_eq!(resp.text, "❌ Unknown command: `/dance`\n\nType `/help` for available commands.");
    }

    #[test]
    fn welcome_lists_agents_and_current() {
        let pages = vec![page("facilitator", true)];
        let text = welcome_message("Ada", &pages, pages.first());
        assert!(text.contains("Hello **Ada**!"));
        assert!(text.contains("🧭 **facilitator title** (`facilitator`) [*default*] - facilitator subtitle"));
        assert!(text.ends_with("**facilitator title**"));
    }
}
