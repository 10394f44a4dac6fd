/// Slash command detection: identify /commands in user messages.
use crate::registry::CommandRegistry;
use crate::types::{CommandArg, CommandInvocation};

/// Parse a message starting with `/` into an invocation.
///
/// Returns `None` for ordinary messages. Names that match no registered
/// alias are still returned, keyed by the name as typed, so the dispatcher
/// can answer them with an error.
pub fn detect_command(text: &str, registry: &CommandRegistry) -> Option<CommandInvocation> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (alias_part, rest) = trimmed
        .split_once(char::is_whitespace)
        .map(|(a, r)| (a, r.trim()))
        .unwrap_or((trimmed, ""));

    let (key, args) = match registry.find_by_alias(alias_part) {
        Some(def) => (def.key.clone(), parse_args(rest, &def.args)),
        None => (
            alias_part.trim_start_matches('/').to_lowercase(),
            rest.split_whitespace().map(str::to_string).collect(),
        ),
    };

    Some(CommandInvocation {
        key,
        raw_alias: alias_part.to_string(),
        args,
        raw_args: rest.to_string(),
    })
}

fn parse_args(text: &str, arg_defs: &[CommandArg]) -> Vec<String> {
    if text.is_empty() || arg_defs.is_empty() {
        return vec![];
    }

    let mut result = Vec::new();
    let mut remaining = text.trim();

    for def in arg_defs {
        if remaining.is_empty() {
            break;
        }
        if def.capture_remaining {
            result.push(remaining.to_string());
            break;
        }
        let (token, rest) = remaining
            .split_once(char::is_whitespace)
            .map(|(t, r)| (t, r.trim()))
            .unwrap_or((remaining, ""));
        result.push(token.to_string());
        remaining = rest;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_messages_are_not_commands() {
        assert!(detect_command("what is card 3?", &CommandRegistry::new()).is_none());
    }

    #[test]
    fn parses_known_command_with_argument() {
        let inv = detect_command("  /Switch facilitator extra", &CommandRegistry::new()).unwrap();
        assert_eq!(inv.key, "switch");
        assert_eq!(inv.args, vec!["facilitator"]);
        assert_eq!(inv.raw_args, "facilitator extra");
    }

    #[test]
    fn missing_argument_leaves_args_empty() {
        let inv = detect_command("/switch", &CommandRegistry::new()).unwrap();
        assert_eq!(inv.key, "switch");
        assert!(inv.args.is_empty());
    }

    #[test]
    fn unknown_command_keeps_typed_name() {
        let inv = detect_command("/Dance now", &CommandRegistry::new()).unwrap();
        assert_eq!(inv.key, "dance");
        assert_eq!(inv.args, vec!["now"]);
    }
}
