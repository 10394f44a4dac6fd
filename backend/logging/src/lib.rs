//! Telemetry and structured logging for the discovery facilitator.
//!
//! Handles log redaction, console and rolling NDJSON output, and structured agent event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{AgentEvent, EventLogEntry, EventLogger};
pub use logger::{default_log_dir, init_logger};
pub use redact::redact_sensitive_data;
