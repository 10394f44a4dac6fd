//! Agent Event Logger
//!
//! Structured events (routing, delegation, reasoning, messages, failures)
//! written through `tracing` under the `agent_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A graph router picked a sub-agent.
    Routed {
        router: String,
        decision: String,
    },
    /// A supervisor handed the conversation to a worker.
    Delegated {
        supervisor: String,
        worker: String,
        reason: String,
        hop: u32,
    },
    /// One reasoning step of a ReAct agent.
    Thought {
        agent: String,
        iteration: u32,
        thought: String,
    },
    Message {
        agent: String,
        role: String,
        content: String,
    },
    /// An upstream failure replaced by the fallback reply.
    Fallback {
        agent: String,
        error_msg: String,
    },
    Error {
        agent: String,
        error_msg: String,
    },
}

impl AgentEvent {
    fn redact(&mut self) {
        match self {
            AgentEvent::Routed { .. } | AgentEvent::Delegated { .. } => {}
            AgentEvent::Thought { thought, .. } => *thought = redact_sensitive_data(thought),
            AgentEvent::Message { content, .. } => *content = redact_sensitive_data(content),
            AgentEvent::Fallback { error_msg, .. } | AgentEvent::Error { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg)
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: AgentEvent,
}

impl EventLogEntry {
    /// Build a redacted entry stamped with the current time.
    pub fn new(session_id: &str, mut event: AgentEvent) -> Self {
        event.redact();
        Self {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    /// Logs an agent's runtime event, redacting free text first.
    pub fn log_event(session_id: &str, event: AgentEvent) {
        let entry = EventLogEntry::new(session_id, event);
        let json = serde_json::to_string(&entry.event).unwrap_or_default();
        info!(
            target: "agent_events",
            session_id = %entry.session_id,
            timestamp = %entry.timestamp.to_rfc3339(),
            event = %json,
            "Agent trace event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_redacts_free_text() {
        let entry = EventLogEntry::new(
            "session-1",
            AgentEvent::Error {
                agent: "facilitator".into(),
                error_msg: "401 for Bearer abc.def.ghi".into(),
            },
        );
        match entry.event {
            AgentEvent::Error { error_msg, .. } => {
                assert!(!error_msg.contains("abc.def.ghi"));
                assert!(error_msg.contains("[REDACTED_TOKEN]"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn events_serialize_with_snake_case_tag() {
        let event = AgentEvent::Delegated {
            supervisor: "lead".into(),
            worker: "facilitator".into(),
            reason: "workshop question".into(),
            hop: 1,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "delegated");
        assert_eq!(json["worker"], "facilitator");
    }

    #[test]
    fn log_event_without_subscriber_is_a_no_op() {
        EventLogger::log_event(
            "session-1",
            AgentEvent::Routed { router: "router".into(), decision: "facilitator".into() },
        );
    }
}
