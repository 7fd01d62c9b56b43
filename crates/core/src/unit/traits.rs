//! Trait definitions for processing units.

use async_trait::async_trait;

use super::error::UnitError;
use super::types::{BatchJobArgs, BatchJobStatus, UnitResponse};
use crate::event::IngestionEvent;

/// A unit invoked inline on the fast path.
///
/// Fast units receive the full ingestion event and are expected to finish
/// within the router's fast-path timeout.
#[async_trait]
pub trait FastUnit: Send + Sync {
    /// Label used in journal entries and metrics.
    fn label(&self) -> &str;

    /// Process one object.
    async fn invoke(&self, event: &IngestionEvent) -> Result<UnitResponse, UnitError>;
}

/// A unit wrapping a long-running batch job.
///
/// `run_job` starts the job and drives it to a terminal state; the router
/// awaits it under the batch deadline.
#[async_trait]
pub trait BatchUnit: Send + Sync {
    /// Label used in journal entries and metrics.
    fn label(&self) -> &str;

    /// Name of the underlying job.
    fn job_name(&self) -> &str;

    /// Start the job and wait for its terminal status.
    async fn run_job(&self, args: &BatchJobArgs) -> Result<BatchJobStatus, UnitError>;
}
