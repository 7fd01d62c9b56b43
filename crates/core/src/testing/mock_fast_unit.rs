//! Mock fast unit for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::event::IngestionEvent;
use crate::unit::{FastUnit, UnitError, UnitResponse};

/// Mock implementation of the FastUnit trait.
///
/// Provides controllable behavior for testing:
/// - Record invocations for assertions
/// - Configure the next response or error
/// - Simulate slow invocations
pub struct MockFastUnit {
    label: String,
    /// Recorded events, in invocation order.
    invocations: Arc<RwLock<Vec<IngestionEvent>>>,
    /// Response returned by the next invocation.
    next_response: Arc<RwLock<UnitResponse>>,
    /// If set, the next invocation fails with this error.
    next_error: Arc<RwLock<Option<UnitError>>>,
    /// Simulated invocation delay.
    delay: Arc<RwLock<Duration>>,
}

impl MockFastUnit {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            invocations: Arc::new(RwLock::new(Vec::new())),
            next_response: Arc::new(RwLock::new(UnitResponse::ok("mock"))),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded invocations.
    pub async fn recorded_invocations(&self) -> Vec<IngestionEvent> {
        self.invocations.read().await.clone()
    }

    /// Get the number of invocations performed.
    pub async fn invocation_count(&self) -> usize {
        self.invocations.read().await.len()
    }

    /// Set the response for subsequent invocations.
    pub async fn set_next_response(&self, response: UnitResponse) {
        *self.next_response.write().await = response;
    }

    /// Configure the next invocation to fail with the given error.
    pub async fn set_next_error(&self, error: UnitError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set a simulated invocation delay.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }
}

#[async_trait]
impl FastUnit for MockFastUnit {
    fn label(&self) -> &str {
        &self.label
    }

    async fn invoke(&self, event: &IngestionEvent) -> Result<UnitResponse, UnitError> {
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.invocations.write().await.push(event.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self.next_response.read().await.clone())
    }
}
