//! Classification Event Logger
//!
//! One structured record per classification request, emitted under the
//! `classification_events` target so it can be routed separately.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassificationEvent {
    Completed {
        provider: String,
        model: String,
        location_type: String,
        space_type: String,
        flagged: Vec<String>,
        latency_ms: u64,
    },
    Failed {
        provider: String,
        error_kind: String,
        message: String,
        latency_ms: u64,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    pub event: ClassificationEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact and emit one event.
    pub fn log_event(mut event: ClassificationEvent) -> EventLogEntry {
        if let ClassificationEvent::Failed { message, .. } = &mut event {
            *message = redact_sensitive_data(message);
        }

        let entry = EventLogEntry {
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry).unwrap_or_default();
        match &entry.event {
            ClassificationEvent::Completed { .. } => {
                info!(target: "classification_events", event = %json, "Classification completed")
            }
            ClassificationEvent::Failed { .. } => {
                warn!(target: "classification_events", event = %json, "Classification failed")
            }
        }
        entry
    }
}
