use serde::{Deserialize, Serialize};

use crate::event::IngestionEvent;

/// Result of a fast-path unit invocation.
///
/// Wire contract with external converters; the JSON field names must stay
/// exactly as they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitResponse {
    pub status_code: u16,
    pub body: String,
}

impl UnitResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Arguments handed to a batch job on start.
///
/// Wire contract with external job runners; the upper-case field names
/// must stay exactly as they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJobArgs {
    #[serde(rename = "JOB_NAME")]
    pub job_name: String,
    #[serde(rename = "SOURCE_BUCKET")]
    pub source_bucket: String,
    #[serde(rename = "SOURCE_KEY")]
    pub source_key: String,
    #[serde(rename = "DEST_BUCKET")]
    pub dest_bucket: String,
    #[serde(rename = "DEST_PREFIX")]
    pub dest_prefix: String,
}

impl BatchJobArgs {
    /// Build job arguments from an ingestion event.
    pub fn from_event(job_name: impl Into<String>, event: &IngestionEvent) -> Self {
        Self {
            job_name: job_name.into(),
            source_bucket: event.bucket_name.clone(),
            source_key: event.object_key.clone(),
            dest_bucket: event.dest_bucket.clone(),
            dest_prefix: event.dest_prefix.clone(),
        }
    }
}

/// Terminal state of a batch job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchJobState {
    Running,
    Succeeded,
    Failed,
}

/// Status report from a batch job runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJobStatus {
    pub state: BatchJobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl BatchJobStatus {
    pub fn succeeded() -> Self {
        Self {
            state: BatchJobState::Succeeded,
            detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            state: BatchJobState::Failed,
            detail: Some(detail.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, BatchJobState::Running)
    }
}
