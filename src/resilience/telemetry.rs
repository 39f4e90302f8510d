// src/resilience/telemetry.rs

//! Performance-tracking collaborator for error telemetry.

use serde::Serialize;

use crate::error::{ErrorKind, Result};

/// One failed attempt, as reported to a tracker.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: String,
    pub component: String,
    pub action: String,
    pub attempt: u32,
    pub message: String,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, component: &str, action: &str, attempt: u32, message: &str) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            component: component.to_string(),
            action: action.to_string(),
            attempt,
            message: message.to_string(),
        }
    }
}

/// Receives error telemetry. Failures are logged by the caller, never
/// propagated.
pub trait PerformanceTracker: Send + Sync {
    fn track_error(&self, report: &ErrorReport) -> Result<()>;
}

/// Writes reports to the log as JSON lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracker;

impl PerformanceTracker for LogTracker {
    fn track_error(&self, report: &ErrorReport) -> Result<()> {
        log::info!(target: "telemetry", "{}", serde_json::to_string(report)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_kind_id() {
        let report = ErrorReport::new(ErrorKind::RateLimit, "NewsStore", "fetch", 2, "slow down");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "rate_limit");
        assert_eq!(json["attempt"], 2);
        assert!(LogTracker.track_error(&report).is_ok());
    }
}
