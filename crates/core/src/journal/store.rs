use chrono::{DateTime, Utc};
use thiserror::Error;

use super::RunRecord;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Filter for querying journal events
#[derive(Debug, Clone, Default)]
pub struct JournalFilter {
    pub run_id: Option<String>,
    pub event_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

impl JournalFilter {
    pub fn new() -> Self {
        Self {
            limit: 100,
            offset: 0,
            ..Default::default()
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn with_time_range(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Trait for journal event storage
pub trait JournalStore: Send + Sync {
    /// Insert a journal record, returns the assigned ID
    fn insert(&self, record: &RunRecord) -> Result<i64, JournalError>;

    /// Query journal records with optional filters
    fn query(&self, filter: &JournalFilter) -> Result<Vec<RunRecord>, JournalError>;

    /// Count matching journal records
    fn count(&self, filter: &JournalFilter) -> Result<i64, JournalError>;
}
