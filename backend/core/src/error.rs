use thiserror::Error;

/// Top-level error type for agent dispatch and the chat client boundary.
#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    /// The chat completion call failed or returned malformed data.
    #[error("upstream chat completion failed: {0}")]
    Upstream(String),

    /// Unknown agent/worker key, malformed definition, unreadable persona.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A routing or delegation reply did not carry the expected marker line.
    #[error("could not parse {marker} from model reply")]
    RoutingParse { marker: String },

    /// The consumer dropped the response stream before it finished.
    #[error("response stream cancelled")]
    Cancelled,
}

impl DiscoveryError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Upstream failures are recovered at the session boundary; everything
    /// else is surfaced to the user as-is.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_upstream_is_recoverable() {
        assert!(DiscoveryError::upstream("timeout").is_recoverable());
        assert!(!DiscoveryError::configuration("missing key").is_recoverable());
        assert!(!DiscoveryError::Cancelled.is_recoverable());
    }

    #[test]
    fn display_names_the_marker() {
        let err = DiscoveryError::RoutingParse { marker: "WORKER:".into() };
        assert_eq!(err.to_string(), "could not parse WORKER: from model reply");
    }
}
