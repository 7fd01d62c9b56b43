use serde::{Deserialize, Serialize};

use crate::event::{DataFormat, Tier};

/// Which invocation style a run takes through the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationPath {
    /// Inline invocation bounded by the fast-path timeout.
    Fast,
    /// Long-running job bounded by the batch deadline.
    Batch,
}

impl InvocationPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationPath::Fast => "fast",
            InvocationPath::Batch => "batch",
        }
    }
}

/// The processing unit chosen for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitSelection {
    FastConvert { tier: Tier, format: DataFormat },
    BatchConvert { tier: Tier, format: DataFormat },
    ModelLoad,
}

impl UnitSelection {
    pub fn path(&self) -> InvocationPath {
        match self {
            UnitSelection::FastConvert { .. } | UnitSelection::ModelLoad => InvocationPath::Fast,
            UnitSelection::BatchConvert { .. } => InvocationPath::Batch,
        }
    }

    /// Label used in journal entries and metrics.
    pub fn label(&self) -> String {
        match self {
            UnitSelection::FastConvert { tier, format } => {
                format!("fast_convert:{}:{}", tier.as_str(), format.as_str())
            }
            UnitSelection::BatchConvert { tier, format } => {
                format!("batch_convert:{}:{}", tier.as_str(), format.as_str())
            }
            UnitSelection::ModelLoad => "model_load".to_string(),
        }
    }
}

/// The router's verdict for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingDecision {
    pub selection: UnitSelection,
    /// Tier the object moves to on success, if any.
    pub next_tier: Option<Tier>,
}

/// Which stage of a run produced its failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The event did not classify on the tier or format axis.
    Classification,
    /// Metadata extraction failed before routing.
    Extraction,
    /// A converter invocation failed, timed out, or reported failure.
    Invocation,
    /// The warehouse load failed.
    ModelLoad,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Classification => "classification",
            ErrorKind::Extraction => "extraction",
            ErrorKind::Invocation => "invocation",
            ErrorKind::ModelLoad => "model_load",
        }
    }
}

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl RunOutcome {
    pub fn succeeded(unit: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Succeeded,
            unit: Some(unit.into()),
            error_kind: None,
            error_detail: None,
        }
    }

    pub fn failed(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Failed,
            unit: None,
            error_kind: Some(kind),
            error_detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Succeeded
    }
}

/// Structured failure log entry.
///
/// Wire contract for error reporting; the JSON field names must stay
/// exactly as they are.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error_message: String,
    pub object_key: String,
    pub bucket_name: String,
    pub request_id: String,
}
