//! Ingestion service.
//!
//! Accepts arrival notifications, extracts event metadata, and drives
//! each run through the router on its own task. Duplicate notifications
//! for the same object are not deduplicated: each one opens its own run,
//! and re-processing is idempotent because destination keys are
//! deterministic.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tokio::task::AbortHandle;

use crate::event::ArrivalNotification;
use crate::extractor::{ExtractError, MetadataExtractor};
use crate::journal::{JournalHandle, RunEvent};
use crate::metrics;
use crate::router::{ErrorReport, RunOutcome, Router};

/// Where a run currently stands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunProgress {
    Running,
    Finished { outcome: RunOutcome },
}

/// Snapshot of one run for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub container: String,
    pub object_key: String,
    #[serde(flatten)]
    pub progress: RunProgress,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

struct RunEntry {
    summary: RunSummary,
    abort: Option<AbortHandle>,
}

/// The ingestion front door.
pub struct IngestService {
    extractor: Arc<MetadataExtractor>,
    router: Arc<Router>,
    journal: JournalHandle,
    runs: Arc<RwLock<HashMap<String, RunEntry>>>,
}

impl IngestService {
    pub fn new(
        extractor: Arc<MetadataExtractor>,
        router: Arc<Router>,
        journal: JournalHandle,
    ) -> Self {
        Self {
            extractor,
            router,
            journal,
            runs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Accept a notification and open a run for it.
    ///
    /// Extraction failures surface to the caller immediately; nothing is
    /// routed for a notification that does not extract.
    pub async fn notify(&self, notification: ArrivalNotification) -> Result<String, ExtractError> {
        let run_id = uuid::Uuid::new_v4().to_string();

        let event = match self.extractor.extract(&notification).await {
            Ok(event) => event,
            Err(e) => {
                metrics::EXTRACTION_FAILURES.inc();
                self.journal
                    .emit(RunEvent::ExtractionFailed {
                        run_id: run_id.clone(),
                        container: notification.container.clone(),
                        object_key_encoded: notification.object_key_encoded.clone(),
                        error: e.to_string(),
                    })
                    .await;
                tracing::warn!(
                    %run_id,
                    container = %notification.container,
                    error = %e,
                    "notification failed metadata extraction"
                );
                return Err(e);
            }
        };

        // A run only exists once extraction has produced an event.
        metrics::RUNS_STARTED.inc();

        self.journal
            .emit(RunEvent::RunStarted {
                run_id: run_id.clone(),
                container: event.bucket_name.clone(),
                object_key: event.object_key.clone(),
                file_size: event.file_size,
                content_type: event.content_type.clone(),
            })
            .await;

        tracing::info!(
            %run_id,
            container = %event.bucket_name,
            object_key = %event.object_key,
            file_size = event.file_size,
            "run started"
        );

        let summary = RunSummary {
            run_id: run_id.clone(),
            container: event.bucket_name.clone(),
            object_key: event.object_key.clone(),
            progress: RunProgress::Running,
            started_at: Utc::now(),
            finished_at: None,
        };

        let router = self.router.clone();
        let journal = self.journal.clone();
        let runs = self.runs.clone();
        let task_run_id = run_id.clone();

        let task = tokio::spawn(async move {
            let started = Instant::now();
            let outcome = router.execute(&task_run_id, &event).await;
            let elapsed = started.elapsed();

            metrics::RUNS_COMPLETED
                .with_label_values(&[outcome.status.as_str()])
                .inc();
            metrics::RUN_DURATION
                .with_label_values(&[outcome.status.as_str()])
                .observe(elapsed.as_secs_f64());

            if outcome.is_success() {
                journal
                    .emit(RunEvent::RunCompleted {
                        run_id: task_run_id.clone(),
                        unit: outcome.unit.clone().unwrap_or_default(),
                        duration_ms: elapsed.as_millis() as u64,
                    })
                    .await;
                tracing::info!(run_id = %task_run_id, "run completed");
            } else {
                let error_kind = outcome
                    .error_kind
                    .map(|k| k.as_str().to_string())
                    .unwrap_or_default();
                let error = outcome.error_detail.clone().unwrap_or_default();

                journal
                    .emit(RunEvent::RunFailed {
                        run_id: task_run_id.clone(),
                        error_kind,
                        error: error.clone(),
                        duration_ms: elapsed.as_millis() as u64,
                    })
                    .await;

                let report = ErrorReport {
                    error_message: error,
                    object_key: event.object_key.clone(),
                    bucket_name: event.bucket_name.clone(),
                    request_id: task_run_id.clone(),
                };
                match serde_json::to_string(&report) {
                    Ok(json) => tracing::error!(run_id = %task_run_id, report = %json, "run failed"),
                    Err(_) => tracing::error!(run_id = %task_run_id, "run failed"),
                }
            }

            let mut runs = runs.write().await;
            if let Some(entry) = runs.get_mut(&task_run_id) {
                entry.summary.progress = RunProgress::Finished { outcome };
                entry.summary.finished_at = Some(Utc::now());
                entry.abort = None;
            }
        });

        self.runs.write().await.insert(
            run_id.clone(),
            RunEntry {
                summary,
                abort: Some(task.abort_handle()),
            },
        );

        Ok(run_id)
    }

    /// Snapshot of one run.
    pub async fn status(&self, run_id: &str) -> Option<RunSummary> {
        self.runs
            .read()
            .await
            .get(run_id)
            .map(|entry| entry.summary.clone())
    }

    /// Snapshot of all known runs, newest first.
    pub async fn list_runs(&self) -> Vec<RunSummary> {
        let mut runs: Vec<RunSummary> = self
            .runs
            .read()
            .await
            .values()
            .map(|entry| entry.summary.clone())
            .collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs
    }

    /// Number of runs still in flight.
    pub async fn active_count(&self) -> usize {
        self.runs
            .read()
            .await
            .values()
            .filter(|entry| matches!(entry.summary.progress, RunProgress::Running))
            .count()
    }

    /// Abort an in-flight run. Returns false if the run is unknown or
    /// already finished.
    pub async fn cancel(&self, run_id: &str) -> bool {
        let mut runs = self.runs.write().await;
        let Some(entry) = runs.get_mut(run_id) else {
            return false;
        };
        let Some(abort) = entry.abort.take() else {
            return false;
        };
        abort.abort();
        entry.summary.progress = RunProgress::Finished {
            outcome: RunOutcome::failed(
                crate::router::ErrorKind::Invocation,
                "cancelled by operator",
            ),
        };
        entry.summary.finished_at = Some(Utc::now());
        tracing::info!(%run_id, "run cancelled");
        true
    }
}
