use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Run journal event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    // System events
    ServiceStarted {
        version: String,
    },
    ServiceStopped {
        reason: String,
    },

    // Run lifecycle
    /// A notification was accepted and a run was opened for it.
    RunStarted {
        run_id: String,
        container: String,
        object_key: String,
        file_size: u64,
        content_type: String,
    },
    /// Metadata extraction failed before a run could be routed.
    ExtractionFailed {
        run_id: String,
        container: String,
        object_key_encoded: String,
        error: String,
    },
    /// The router classified the event and chose a processing unit.
    DecisionMade {
        run_id: String,
        /// "fast" or "batch"
        path: String,
        /// Label of the selected unit
        unit: String,
        tier: String,
        file_size: u64,
    },
    /// A processing unit was invoked.
    UnitInvoked {
        run_id: String,
        unit: String,
        duration_ms: u64,
        success: bool,
    },
    /// The run reached its success terminal state.
    RunCompleted {
        run_id: String,
        unit: String,
        duration_ms: u64,
    },
    /// The run reached its failure terminal state.
    RunFailed {
        run_id: String,
        /// Which stage failed: "classification", "extraction", "invocation", "model_load"
        error_kind: String,
        error: String,
        duration_ms: u64,
    },
}

impl RunEvent {
    /// Returns the event type as a string for storage
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ServiceStarted { .. } => "service_started",
            Self::ServiceStopped { .. } => "service_stopped",
            Self::RunStarted { .. } => "run_started",
            Self::ExtractionFailed { .. } => "extraction_failed",
            Self::DecisionMade { .. } => "decision_made",
            Self::UnitInvoked { .. } => "unit_invoked",
            Self::RunCompleted { .. } => "run_completed",
            Self::RunFailed { .. } => "run_failed",
        }
    }

    /// Extract run_id if this event belongs to a run
    pub fn run_id(&self) -> Option<&str> {
        match self {
            Self::RunStarted { run_id, .. }
            | Self::ExtractionFailed { run_id, .. }
            | Self::DecisionMade { run_id, .. }
            | Self::UnitInvoked { run_id, .. }
            | Self::RunCompleted { run_id, .. }
            | Self::RunFailed { run_id, .. } => Some(run_id),
            _ => None,
        }
    }
}

/// A stored journal record with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub run_id: Option<String>,
    pub data: RunEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_service_started() {
        let event = RunEvent::ServiceStarted {
            version: "0.1.0".to_string(),
        };
        assert_eq!(event.event_type(), "service_started");
        assert_eq!(event.run_id(), None);
    }

    #[test]
    fn test_event_type_run_started() {
        let event = RunEvent::RunStarted {
            run_id: "run-123".to_string(),
            container: "my-stage-bucket".to_string(),
            object_key: "claims/type=structured/f.csv".to_string(),
            file_size: 1024,
            content_type: "text/csv".to_string(),
        };
        assert_eq!(event.event_type(), "run_started");
        assert_eq!(event.run_id(), Some("run-123"));
    }

    #[test]
    fn test_event_type_decision_made() {
        let event = RunEvent::DecisionMade {
            run_id: "run-123".to_string(),
            path: "fast".to_string(),
            unit: "fast_convert:stage:structured".to_string(),
            tier: "stage".to_string(),
            file_size: 1024,
        };
        assert_eq!(event.event_type(), "decision_made");
        assert_eq!(event.run_id(), Some("run-123"));
    }

    #[test]
    fn test_serialize_deserialize_run_failed() {
        let event = RunEvent::RunFailed {
            run_id: "run-9".to_string(),
            error_kind: "classification".to_string(),
            error: "container \"random\" does not match any tier".to_string(),
            duration_ms: 3,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"run_failed\""));
        assert!(json.contains("\"error_kind\":\"classification\""));

        let deserialized: RunEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.event_type(), "run_failed");
        assert_eq!(deserialized.run_id(), Some("run-9"));
    }

    #[test]
    fn test_record_serialize() {
        let record = RunRecord {
            id: 1,
            timestamp: Utc::now(),
            event_type: "service_started".to_string(),
            run_id: None,
            data: RunEvent::ServiceStarted {
                version: "0.1.0".to_string(),
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"event_type\":\"service_started\""));
    }
}
