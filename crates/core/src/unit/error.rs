use thiserror::Error;

use crate::store::StoreError;

/// Errors raised by processing units.
#[derive(Debug, Error)]
pub enum UnitError {
    /// The unit's endpoint could not be reached or returned garbage.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backing object store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A batch job could not be started or reported failure.
    #[error("batch job {job_name} failed: {detail}")]
    Job { job_name: String, detail: String },

    /// The warehouse ingest API rejected the request.
    #[error("warehouse responded with status {status}: {detail}")]
    Warehouse { status: u16, detail: String },

    /// No ingest pipe is mapped for the object's key prefix.
    #[error("no ingest pipe configured for key {object_key:?}")]
    NoPipeForKey { object_key: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}
