use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::RunEvent;

/// Envelope wrapping a journal event with metadata
#[derive(Debug, Clone)]
pub struct RunEventEnvelope {
    pub timestamp: DateTime<Utc>,
    pub event: RunEvent,
}

/// Handle for emitting journal events
///
/// Cheaply cloneable and shared across tasks. Events are sent through an
/// async channel to be written by the JournalWriter.
#[derive(Clone)]
pub struct JournalHandle {
    tx: mpsc::Sender<RunEventEnvelope>,
}

impl JournalHandle {
    pub fn new(tx: mpsc::Sender<RunEventEnvelope>) -> Self {
        Self { tx }
    }

    /// Emit a journal event asynchronously
    ///
    /// If the channel is full or closed, the error is logged but the caller
    /// is not blocked or failed.
    pub async fn emit(&self, event: RunEvent) {
        let envelope = RunEventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        if let Err(e) = self.tx.send(envelope).await {
            tracing::error!("Failed to emit journal event: {}", e);
        }
    }

    /// Try to emit a journal event without blocking
    ///
    /// Returns true if the event was sent successfully.
    pub fn try_emit(&self, event: RunEvent) -> bool {
        let envelope = RunEventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        match self.tx.try_send(envelope) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to emit journal event: {}", e);
                false
            }
        }
    }
}
