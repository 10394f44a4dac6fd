//! Prompts and reply parsing for graph routing and supervisor delegation.

use discovery_core::{last_turns, ChatMessage, DiscoveryError};

/// Turns of history a router sees.
pub const ROUTING_WINDOW: usize = 5;

/// Worker name a supervisor answers with when it will not delegate.
pub const END_MARKER: &str = "END";

const DEFAULT_REASON: &str = "No specific delegation needed";

// ---------------------------------------------------------------------------
// Graph routing
// ---------------------------------------------------------------------------

/// User content of a routing request: the last few turns joined by single
/// spaces.
pub fn routing_input(turns: &[ChatMessage]) -> String {
    last_turns(turns, ROUTING_WINDOW)
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Routing request: the condition as the only system prompt.
pub fn routing_messages(condition: &str, input: String) -> Vec<ChatMessage> {
    vec![ChatMessage::system(condition), ChatMessage::user(input)]
}

/// The chosen agent key: first line of the reply, trimmed and lowercased.
pub fn parse_route(reply: &str) -> String {
    reply.trim().lines().next().unwrap_or_default().trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Supervisor delegation
// ---------------------------------------------------------------------------

/// System prompt of a delegation decision.
pub fn supervisor_prompt(workers: &[String], delegation_prompt: &str) -> String {
    format!(
        "You are a supervisor agent responsible for delegating tasks to worker agents.\n\
         Available workers: {}\n\
         Based on the conversation history, determine which worker agent should handle the current request.\n\
         If no delegation is needed (e.g., you can answer directly), respond with 'END'.\n\
         Respond in the following format:\n\
         WORKER: [worker_name or END]\n\
         REASON: [brief explanation of why this worker was chosen]\n\
         {}",
        workers.join(", "),
        delegation_prompt
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    pub worker: String,
    pub reason: String,
}

impl Delegation {
    /// The worker to run, when the decision names one of `workers`.
    pub fn target<'a>(&self, workers: &'a [String]) -> Option<&'a String> {
        if self.worker == END_MARKER {
            return None;
        }
        workers.iter().find(|w| **w == self.worker)
    }
}

/// Parse `WORKER:` / `REASON:` lines. The last occurrence of each wins.
pub fn parse_delegation(reply: &str) -> Result<Delegation, DiscoveryError> {
    let mut worker = None;
    let mut reason = None;
    for line in reply.trim().lines() {
        let line = line.trim_start();
        if let Some(rest) = line.strip_prefix("WORKER:") {
            worker = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("REASON:") {
            reason = Some(rest.trim().to_string());
        }
    }
    let worker = worker.ok_or_else(|| DiscoveryError::RoutingParse {
        marker: "WORKER:".into(),
    })?;
    Ok(Delegation {
        worker,
        reason: reason.unwrap_or_else(|| DEFAULT_REASON.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(n: usize) -> Vec<ChatMessage> {
        (0..n)
            .map(|i| if i % 2 == 0 { ChatMessage::user(format!("u{i}")) } else { ChatMessage::assistant(format!("a{i}")) })
            .collect()
    }

    #[test]
    fn routing_input_uses_last_five_turns() {
        assert_eq!(routing_input(&turns(7)), "u2 a3 u4 a5 u6");
        assert_eq!(routing_input(&turns(2)), "u0 a1");
        assert_eq!(routing_input(&[]), "");
    }

    #[test]
    fn route_is_first_line_lowercased() {
        assert_eq!(parse_route("  Facilitator \n because it fits"), "facilitator");
        assert_eq!(parse_route("\n\n"), "");
    }

    #[test]
    fn supervisor_prompt_lists_workers_and_appends_instruction() {
        let prompt = supervisor_prompt(&["a".into(), "b".into()], "Prefer a.");
        assert!(prompt.starts_with("You are a supervisor agent"));
        assert!(prompt.contains("Available workers: a, b\n"));
        assert!(prompt.contains("WORKER: [worker_name or END]\n"));
        assert!(prompt.ends_with("\nPrefer a."));
    }

    #[test]
    fn parses_worker_and_reason() {
        let d = parse_delegation("WORKER: facilitator\nREASON: workshop question").unwrap();
        assert_eq!(d.worker, "facilitator");
        assert_eq!(d.reason, "workshop question");

        let workers = vec!["facilitator".to_string()];
        assert_eq!(d.target(&workers).map(String::as_str), Some("facilitator"));
    }

    #[test]
    fn end_and_unlisted_workers_stop_delegation() {
        let workers = vec!["facilitator".to_string()];
        let end = parse_delegation("WORKER: END").unwrap();
        assert_eq!(end.reason, "No specific delegation needed");
        assert!(end.target(&workers).is_none());
        assert!(parse_delegation("WORKER: stranger").unwrap().target(&workers).is_none());
    }

    #[test]
    fn missing_worker_line_is_parse_error() {
        let err = parse_delegation("I will answer this myself.").unwrap_err();
        assert!(matches!(err, DiscoveryError::RoutingParse { ref marker } if marker == "WORKER:"));
    }
}
