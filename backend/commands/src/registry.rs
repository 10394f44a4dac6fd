/// Slash command registry.
use crate::types::{CommandArg, CommandDef};

fn command(key: &str, description: &str, args: Vec<CommandArg>) -> CommandDef {
    CommandDef {
        key: key.to_string(),
        description: description.to_string(),
        text_aliases: vec![format!("/{key}")],
        args,
    }
}

fn required_arg(name: &str, description: &str) -> CommandArg {
    CommandArg {
        name: name.to_string(),
        description: description.to_string(),
        required: true,
        capture_remaining: false,
    }
}

/// The built-in commands, in help order.
pub fn builtin_commands() -> Vec<CommandDef> {
    vec![
        command(
            "switch",
            "Switch to a specific agent",
            vec![required_arg("agent_key", "Key of the agent to activate")],
        ),
        command("list", "Show all available agents", vec![]),
        command("current", "Show current active agent", vec![]),
        command("help", "Show this help message", vec![]),
        command("clear", "Clear chat history", vec![]),
    ]
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: Vec<CommandDef>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self { commands: builtin_commands() }
    }

    pub fn register(&mut self, def: CommandDef) {
        self.commands.push(def);
    }

    pub fn all(&self) -> &[CommandDef] {
        &self.commands
    }

    /// Find a command by slash-text alias (e.g. "/switch"), ignoring case.
    pub fn find_by_alias(&self, alias: &str) -> Option<&CommandDef> {
        let lower = alias.to_lowercase();
        self.commands
            .iter()
            .find(|c| c.text_aliases.iter().any(|a| a.to_lowercase() == lower))
    }

    pub fn find_by_key(&self, key: &str) -> Option<&CommandDef> {
        self.commands.iter().find(|c| c.key == key)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_case_insensitive() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.find_by_alias("/SWITCH").map(|c| c.key.as_str()), Some("switch"));
        assert!(registry.find_by_alias("/status").is_none());
    }

    #[test]
    fn usage_lists_arguments() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.find_by_key("switch").unwrap().usage(), "/switch <agent_key>");
        assert_eq!(registry.find_by_key("clear").unwrap().usage(), "/clear");
    }
}
