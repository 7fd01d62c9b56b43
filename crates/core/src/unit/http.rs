use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::error::UnitError;
use super::traits::{BatchUnit, FastUnit};
use super::types::{BatchJobArgs, BatchJobState, BatchJobStatus, UnitResponse};
use crate::event::IngestionEvent;

/// Fast-path converter backed by an HTTP endpoint.
///
/// The endpoint receives the ingestion event verbatim and answers with a
/// `{statusCode, body}` document.
pub struct HttpFastUnit {
    label: String,
    endpoint: String,
    client: reqwest::Client,
}

impl HttpFastUnit {
    pub fn new(label: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl FastUnit for HttpFastUnit {
    fn label(&self) -> &str {
        &self.label
    }

    async fn invoke(&self, event: &IngestionEvent) -> Result<UnitResponse, UnitError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(event)
            .send()
            .await
            .map_err(|e| UnitError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UnitError::Transport(format!(
                "converter endpoint {} returned HTTP {}",
                self.endpoint,
                response.status()
            )));
        }

        response
            .json::<UnitResponse>()
            .await
            .map_err(|e| UnitError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct JobStartReply {
    #[serde(rename = "jobRunId")]
    job_run_id: String,
}

#[derive(Debug, Deserialize)]
struct JobStatusReply {
    #[serde(rename = "jobRunState")]
    job_run_state: String,
    #[serde(default)]
    detail: Option<String>,
}

/// Batch converter backed by an external job runner.
///
/// Starting the job yields a run id which is then polled at a fixed
/// interval until the runner reports a terminal state. The overall
/// deadline is enforced by the caller.
pub struct HttpBatchUnit {
    label: String,
    job_name: String,
    start_endpoint: String,
    status_endpoint: String,
    poll_interval: Duration,
    client: reqwest::Client,
}

impl HttpBatchUnit {
    pub fn new(
        label: impl Into<String>,
        job_name: impl Into<String>,
        start_endpoint: impl Into<String>,
        status_endpoint: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            label: label.into(),
            job_name: job_name.into(),
            start_endpoint: start_endpoint.into(),
            status_endpoint: status_endpoint.into(),
            poll_interval,
            client: reqwest::Client::new(),
        }
    }

    async fn start(&self, args: &BatchJobArgs) -> Result<String, UnitError> {
        let response = self
            .client
            .post(&self.start_endpoint)
            .json(args)
            .send()
            .await
            .map_err(|e| UnitError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UnitError::Job {
                job_name: self.job_name.clone(),
                detail: format!("start returned HTTP {}", response.status()),
            });
        }

        let reply: JobStartReply = response
            .json()
            .await
            .map_err(|e| UnitError::Serialization(e.to_string()))?;
        Ok(reply.job_run_id)
    }

    async fn poll(&self, job_run_id: &str) -> Result<BatchJobStatus, UnitError> {
        let response = self
            .client
            .get(&self.status_endpoint)
            .query(&[("jobRunId", job_run_id)])
            .send()
            .await
            .map_err(|e| UnitError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UnitError::Job {
                job_name: self.job_name.clone(),
                detail: format!("status returned HTTP {}", response.status()),
            });
        }

        let reply: JobStatusReply = response
            .json()
            .await
            .map_err(|e| UnitError::Serialization(e.to_string()))?;

        let state = match reply.job_run_state.as_str() {
            "SUCCEEDED" => BatchJobState::Succeeded,
            "FAILED" | "ERROR" | "TIMEOUT" | "STOPPED" => BatchJobState::Failed,
            _ => BatchJobState::Running,
        };

        Ok(BatchJobStatus {
            state,
            detail: reply.detail,
        })
    }
}

#[async_trait]
impl BatchUnit for HttpBatchUnit {
    fn label(&self) -> &str {
        &self.label
    }

    fn job_name(&self) -> &str {
        &self.job_name
    }

    async fn run_job(&self, args: &BatchJobArgs) -> Result<BatchJobStatus, UnitError> {
        let job_run_id = self.start(args).await?;
        tracing::info!(job_name = %self.job_name, %job_run_id, "batch job started");

        loop {
            tokio::time::sleep(self.poll_interval).await;
            let status = self.poll(&job_run_id).await?;
            if status.is_terminal() {
                tracing::info!(
                    job_name = %self.job_name,
                    %job_run_id,
                    state = ?status.state,
                    "batch job finished"
                );
                return Ok(status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_unit_label() {
        let unit = HttpFastUnit::new("fast_convert:stage:structured", "http://c.local/convert");
        assert_eq!(unit.label(), "fast_convert:stage:structured");
    }

    #[test]
    fn test_batch_unit_labels() {
        let unit = HttpBatchUnit::new(
            "batch_convert:stage:structured",
            "structured-curated-job",
            "http://jobs.local/start",
            "http://jobs.local/status",
            Duration::from_secs(30),
        );
        assert_eq!(unit.label(), "batch_convert:stage:structured");
        assert_eq!(unit.job_name(), "structured-curated-job");
    }

    #[test]
    fn test_job_status_reply_parsing() {
        let reply: JobStatusReply =
            serde_json::from_str(r#"{"jobRunState":"SUCCEEDED"}"#).unwrap();
        assert_eq!(reply.job_run_state, "SUCCEEDED");
        assert!(reply.detail.is_none());

        let reply: JobStatusReply =
            serde_json::from_str(r#"{"jobRunState":"FAILED","detail":"oom"}"#).unwrap();
        assert_eq!(reply.detail.as_deref(), Some("oom"));
    }
}
