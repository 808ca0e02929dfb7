//! Structured logging for propscope.
//!
//! Handles subscriber setup (console + rolling NDJSON file), secret and
//! image-payload redaction, and classification audit events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{ClassificationEvent, EventLogEntry, EventLogger};
pub use logger::{init_logger, LoggerOptions};
pub use redact::redact_sensitive_data;
