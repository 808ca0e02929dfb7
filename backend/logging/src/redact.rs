//! Log Redaction Layer
//!
//! Scrubs API keys, bearer tokens, and inline image payloads from strings
//! before they are logged or returned to a client.

use once_cell::sync::Lazy;
use regex::Regex;

static API_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(sk-(?:ant-)?[A-Za-z0-9_\-]{16,})|(Bearer\s+[A-Za-z0-9\-\._~+/]+=*)|((?i:x-api-key)\s*[:=]\s*\S+)")
        .unwrap()
});

/// Long unbroken base64 runs are image data, not diagnostics.
static BASE64_BLOB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9+/]{256,}={0,2}").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]");
    BASE64_BLOB_RE
        .replace_all(&redacted, |caps: &regex::Captures| {
            format!("[BASE64 {} chars]", caps[0].len())
        })
        .into_owned()
}
