use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RouterConfig;
use crate::event::IngestionEvent;
use crate::journal::{JournalHandle, RunEvent};
use crate::metrics;
use crate::unit::{BatchJobArgs, BatchJobState, UnitCatalog};

use super::decision::classify;
use super::types::{ErrorKind, RoutingDecision, RunOutcome, UnitSelection};

/// Executes routing decisions against the unit catalog.
///
/// One call to [`Router::execute`] takes an event through classification,
/// a single unit invocation and result check, and returns the terminal
/// outcome. There are no retries: a failed invocation fails the run.
pub struct Router {
    catalog: Arc<UnitCatalog>,
    config: RouterConfig,
    journal: Option<JournalHandle>,
}

impl Router {
    pub fn new(catalog: Arc<UnitCatalog>, config: RouterConfig) -> Self {
        Self {
            catalog,
            config,
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: JournalHandle) -> Self {
        self.journal = Some(journal);
        self
    }

    async fn emit(&self, event: RunEvent) {
        if let Some(journal) = &self.journal {
            journal.emit(event).await;
        }
    }

    /// Route one event to its terminal outcome.
    pub async fn execute(&self, run_id: &str, event: &IngestionEvent) -> RunOutcome {
        let decision = match classify(event, self.config.size_threshold_bytes) {
            Ok(decision) => decision,
            Err(e) => {
                metrics::CLASSIFICATION_REJECTIONS.inc();
                tracing::warn!(%run_id, error = %e, "event did not classify");
                return RunOutcome::failed(ErrorKind::Classification, e.to_string());
            }
        };

        let unit_label = decision.selection.label();
        let path = decision.selection.path();

        metrics::ROUTING_DECISIONS
            .with_label_values(&[path.as_str(), &unit_label])
            .inc();

        let tier = match decision.selection {
            UnitSelection::FastConvert { tier, .. } | UnitSelection::BatchConvert { tier, .. } => {
                tier.as_str()
            }
            UnitSelection::ModelLoad => "application",
        };

        self.emit(RunEvent::DecisionMade {
            run_id: run_id.to_string(),
            path: path.as_str().to_string(),
            unit: unit_label.clone(),
            tier: tier.to_string(),
            file_size: event.file_size,
        })
        .await;

        tracing::info!(
            %run_id,
            path = path.as_str(),
            unit = %unit_label,
            file_size = event.file_size,
            "routing decision made"
        );

        let started = Instant::now();
        let outcome = self.invoke(&decision, &unit_label, event).await;
        let elapsed = started.elapsed();

        metrics::UNIT_DURATION
            .with_label_values(&[&unit_label])
            .observe(elapsed.as_secs_f64());
        metrics::UNIT_INVOCATIONS
            .with_label_values(&[
                &unit_label,
                if outcome.is_success() { "success" } else { "error" },
            ])
            .inc();

        self.emit(RunEvent::UnitInvoked {
            run_id: run_id.to_string(),
            unit: unit_label,
            duration_ms: elapsed.as_millis() as u64,
            success: outcome.is_success(),
        })
        .await;

        outcome
    }

    async fn invoke(
        &self,
        decision: &RoutingDecision,
        unit_label: &str,
        event: &IngestionEvent,
    ) -> RunOutcome {
        match decision.selection {
            UnitSelection::ModelLoad => {
                let Some(unit) = self.catalog.model_load() else {
                    return RunOutcome::failed(
                        ErrorKind::ModelLoad,
                        "no model-load unit configured",
                    );
                };
                self.invoke_fast(unit, event, ErrorKind::ModelLoad, unit_label)
                    .await
            }
            UnitSelection::FastConvert { tier, format } => {
                let Some(unit) = self.catalog.fast(tier, format) else {
                    return RunOutcome::failed(
                        ErrorKind::Invocation,
                        format!("no fast unit for tier={} format={}", tier.as_str(), format.as_str()),
                    );
                };
                self.invoke_fast(unit, event, ErrorKind::Invocation, unit_label)
                    .await
            }
            UnitSelection::BatchConvert { tier, format } => {
                let Some(unit) = self.catalog.batch(tier, format) else {
                    return RunOutcome::failed(
                        ErrorKind::Invocation,
                        format!(
                            "no batch unit for tier={} format={}",
                            tier.as_str(),
                            format.as_str()
                        ),
                    );
                };

                let args = BatchJobArgs::from_event(unit.job_name(), event);
                let deadline = Duration::from_secs(self.config.batch_deadline_secs);

                match tokio::time::timeout(deadline, unit.run_job(&args)).await {
                    Ok(Ok(status)) => match status.state {
                        BatchJobState::Succeeded => RunOutcome::succeeded(unit_label),
                        _ => RunOutcome::failed(
                            ErrorKind::Invocation,
                            status
                                .detail
                                .unwrap_or_else(|| "batch job failed".to_string()),
                        ),
                    },
                    Ok(Err(e)) => RunOutcome::failed(ErrorKind::Invocation, e.to_string()),
                    Err(_) => RunOutcome::failed(
                        ErrorKind::Invocation,
                        format!("batch job exceeded deadline of {}s", deadline.as_secs()),
                    ),
                }
            }
        }
    }

    async fn invoke_fast(
        &self,
        unit: Arc<dyn crate::unit::FastUnit>,
        event: &IngestionEvent,
        error_kind: ErrorKind,
        unit_label: &str,
    ) -> RunOutcome {
        let timeout = Duration::from_secs(self.config.fast_timeout_secs);
        match tokio::time::timeout(timeout, unit.invoke(event)).await {
            Ok(Ok(response)) if response.is_success() => RunOutcome::succeeded(unit_label),
            Ok(Ok(response)) => RunOutcome::failed(
                error_kind,
                format!(
                    "unit returned status {}: {}",
                    response.status_code, response.body
                ),
            ),
            Ok(Err(e)) => RunOutcome::failed(error_kind, e.to_string()),
            Err(_) => RunOutcome::failed(
                error_kind,
                format!("invocation exceeded timeout of {}s", timeout.as_secs()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DataFormat, Tier};
    use crate::journal::create_journal_system;
    use crate::journal::{JournalFilter, JournalStore, SqliteJournal};
    use crate::testing::{MockBatchUnit, MockFastUnit};
    use crate::unit::{BatchJobStatus, UnitError, UnitResponse};

    fn config() -> RouterConfig {
        RouterConfig {
            size_threshold_bytes: 1024,
            fast_timeout_secs: 2,
            batch_poll_interval_secs: 1,
            batch_deadline_secs: 2,
        }
    }

    fn event(bucket: &str, key: &str, size: u64) -> IngestionEvent {
        IngestionEvent {
            bucket_name: bucket.to_string(),
            bucket_name_lower: bucket.to_lowercase(),
            object_key: key.to_string(),
            content_type: "application/octet-stream".to_string(),
            file_size: size,
            dest_bucket: "my-curated-bucket".to_string(),
            dest_prefix: "p".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fast_path_success() {
        let fast = Arc::new(MockFastUnit::new("fast_convert:stage:structured"));
        let catalog = Arc::new(
            UnitCatalog::new().with_fast(Tier::Stage, DataFormat::Structured, fast.clone()),
        );
        let router = Router::new(catalog, config());

        let outcome = router
            .execute(
                "run-1",
                &event("my-stage-bucket", "claims/type=structured/f.csv", 10),
            )
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.unit.as_deref(), Some("fast_convert:stage:structured"));
        assert_eq!(fast.invocation_count().await, 1);
    }

    #[tokio::test]
    async fn test_batch_path_success() {
        let batch = Arc::new(MockBatchUnit::new(
            "batch_convert:stage:structured",
            "structured-curated-job",
        ));
        let catalog = Arc::new(
            UnitCatalog::new().with_batch(Tier::Stage, DataFormat::Structured, batch.clone()),
        );
        let router = Router::new(catalog, config());

        let outcome = router
            .execute(
                "run-1",
                &event("my-stage-bucket", "claims/type=structured/f.csv", 2048),
            )
            .await;

        assert!(outcome.is_success());

        let jobs = batch.recorded_jobs().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_name, "structured-curated-job");
        assert_eq!(jobs[0].source_bucket, "my-stage-bucket");
    }

    #[tokio::test]
    async fn test_unknown_tier_fails_without_invocation() {
        let fast = Arc::new(MockFastUnit::new("fast_convert:stage:structured"));
        let catalog = Arc::new(
            UnitCatalog::new().with_fast(Tier::Stage, DataFormat::Structured, fast.clone()),
        );
        let router = Router::new(catalog, config());

        let outcome = router
            .execute("run-1", &event("other", "claims/type=structured/f.csv", 10))
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.error_kind, Some(ErrorKind::Classification));
        assert_eq!(fast.invocation_count().await, 0);
    }

    #[tokio::test]
    async fn test_non_success_unit_response_fails_run() {
        let fast = Arc::new(MockFastUnit::new("fast_convert:stage:structured"));
        fast.set_next_response(UnitResponse {
            status_code: 500,
            body: "converter blew up".to_string(),
        })
        .await;
        let catalog =
            Arc::new(UnitCatalog::new().with_fast(Tier::Stage, DataFormat::Structured, fast));
        let router = Router::new(catalog, config());

        let outcome = router
            .execute(
                "run-1",
                &event("my-stage-bucket", "claims/type=structured/f.csv", 10),
            )
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.error_kind, Some(ErrorKind::Invocation));
        assert!(outcome.error_detail.unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_unit_error_fails_run() {
        let fast = Arc::new(MockFastUnit::new("fast_convert:stage:structured"));
        fast.set_next_error(UnitError::Transport("connection refused".to_string()))
            .await;
        let catalog =
            Arc::new(UnitCatalog::new().with_fast(Tier::Stage, DataFormat::Structured, fast));
        let router = Router::new(catalog, config());

        let outcome = router
            .execute(
                "run-1",
                &event("my-stage-bucket", "claims/type=structured/f.csv", 10),
            )
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.error_kind, Some(ErrorKind::Invocation));
    }

    #[tokio::test]
    async fn test_fast_timeout_fails_run() {
        let fast = Arc::new(MockFastUnit::new("fast_convert:stage:structured"));
        fast.set_delay(Duration::from_secs(10)).await;
        let catalog =
            Arc::new(UnitCatalog::new().with_fast(Tier::Stage, DataFormat::Structured, fast));
        let mut cfg = config();
        cfg.fast_timeout_secs = 1;
        let router = Router::new(catalog, cfg);

        let outcome = router
            .execute(
                "run-1",
                &event("my-stage-bucket", "claims/type=structured/f.csv", 10),
            )
            .await;

        assert!(!outcome.is_success());
        assert!(outcome.error_detail.unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn test_batch_job_failure_fails_run() {
        let batch = Arc::new(MockBatchUnit::new(
            "batch_convert:stage:structured",
            "structured-curated-job",
        ));
        batch
            .set_next_status(BatchJobStatus::failed("executor lost"))
            .await;
        let catalog =
            Arc::new(UnitCatalog::new().with_batch(Tier::Stage, DataFormat::Structured, batch));
        let router = Router::new(catalog, config());

        let outcome = router
            .execute(
                "run-1",
                &event("my-stage-bucket", "claims/type=structured/f.csv", 2048),
            )
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.error_detail.as_deref(), Some("executor lost"));
    }

    #[tokio::test]
    async fn test_model_load_bypasses_format() {
        let model = Arc::new(MockFastUnit::new("model_load"));
        let catalog = Arc::new(UnitCatalog::new().with_model_load(model.clone()));
        let router = Router::new(catalog, config());

        // Key without a type= segment, size over threshold: still routed
        // to the model load.
        let outcome = router
            .execute(
                "run-1",
                &event("my-application-bucket", "claims/model/fact/p.parquet", 4096),
            )
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.unit.as_deref(), Some("model_load"));
        assert_eq!(model.invocation_count().await, 1);
    }

    #[tokio::test]
    async fn test_missing_model_load_unit_fails() {
        let catalog = Arc::new(UnitCatalog::new());
        let router = Router::new(catalog, config());

        let outcome = router
            .execute(
                "run-1",
                &event("my-application-bucket", "claims/model/fact/p.parquet", 10),
            )
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.error_kind, Some(ErrorKind::ModelLoad));
    }

    #[tokio::test]
    async fn test_journal_records_decision_and_invocation() {
        let store = Arc::new(SqliteJournal::in_memory().unwrap());
        let store_dyn: Arc<dyn JournalStore> = store.clone();
        let (handle, writer) = create_journal_system(store_dyn, 16);
        let writer_handle = tokio::spawn(writer.run());

        let fast = Arc::new(MockFastUnit::new("fast_convert:stage:structured"));
        let catalog =
            Arc::new(UnitCatalog::new().with_fast(Tier::Stage, DataFormat::Structured, fast));
        let router = Router::new(catalog, config()).with_journal(handle.clone());

        router
            .execute(
                "run-7",
                &event("my-stage-bucket", "claims/type=structured/f.csv", 10),
            )
            .await;

        drop(router);
        drop(handle);
        writer_handle.await.unwrap();

        let records = store
            .query(&JournalFilter::new().with_run_id("run-7"))
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event_type, "decision_made");
        assert_eq!(records[1].event_type, "unit_invoked");
    }
}
