//! Mock batch unit for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::unit::{BatchJobArgs, BatchJobStatus, BatchUnit, UnitError};

/// Mock implementation of the BatchUnit trait.
///
/// Records submitted jobs and reports a configurable terminal status.
pub struct MockBatchUnit {
    label: String,
    job_name: String,
    /// Recorded job arguments, in submission order.
    jobs: Arc<RwLock<Vec<BatchJobArgs>>>,
    /// Terminal status returned by the next run.
    next_status: Arc<RwLock<BatchJobStatus>>,
    /// If set, the next run fails with this error.
    next_error: Arc<RwLock<Option<UnitError>>>,
    /// Simulated job duration.
    delay: Arc<RwLock<Duration>>,
}

impl MockBatchUnit {
    pub fn new(label: impl Into<String>, job_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            job_name: job_name.into(),
            jobs: Arc::new(RwLock::new(Vec::new())),
            next_status: Arc::new(RwLock::new(BatchJobStatus::succeeded())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded job submissions.
    pub async fn recorded_jobs(&self) -> Vec<BatchJobArgs> {
        self.jobs.read().await.clone()
    }

    /// Get the number of jobs run.
    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Set the terminal status for subsequent runs.
    pub async fn set_next_status(&self, status: BatchJobStatus) {
        *self.next_status.write().await = status;
    }

    /// Configure the next run to fail with the given error.
    pub async fn set_next_error(&self, error: UnitError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set a simulated job duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }
}

#[async_trait]
impl BatchUnit for MockBatchUnit {
    fn label(&self) -> &str {
        &self.label
    }

    fn job_name(&self) -> &str {
        &self.job_name
    }

    async fn run_job(&self, args: &BatchJobArgs) -> Result<BatchJobStatus, UnitError> {
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.jobs.write().await.push(args.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self.next_status.read().await.clone())
    }
}
