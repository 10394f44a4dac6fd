//! Log Redaction
//!
//! Scrubs API keys, access tokens, and phone numbers from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9_\-]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});
/// Azure `api-key: <32 hex>` headers echoed back in error bodies.
static AZURE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(api-key[\s:=]+)[a-f0-9]{32}").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    // Keys first: long hex keys would otherwise look like phone numbers.
    let redacted = AZURE_KEY_RE.replace_all(input, "${1}[REDACTED_TOKEN]");
    let redacted = API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    TELEPHONE_RE
        .replace_all(&redacted, "[REDACTED_PHONE]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_phone_and_bearer() {
        let raw = "Sending to +1-555-123-4567 with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("+1-555-123-4567"));
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
    }

    #[test]
    fn redacts_openai_and_azure_keys() {
        let clean = redact_sensitive_data("key sk-proj-abcdefghijklmnopqrstuvwxyz012345 rejected");
        assert_eq!(clean, "key [REDACTED_TOKEN] rejected");

        let clean = redact_sensitive_data("header api-key: 0123456789abcdef0123456789abcdef");
        assert_eq!(clean, "header api-key: [REDACTED_TOKEN]");
    }

    #[test]
    fn leaves_ordinary_text_alone() {
        let text = "Let's map the customer journey in 3 steps.";
        assert_eq!(redact_sensitive_data(text), text);
    }
}
