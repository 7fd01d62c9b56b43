use std::sync::Arc;

use tokio::sync::mpsc;

use super::{JournalHandle, JournalStore, RunEventEnvelope, RunRecord};

/// Background task that receives journal events and writes them to storage
pub struct JournalWriter {
    rx: mpsc::Receiver<RunEventEnvelope>,
    store: Arc<dyn JournalStore>,
}

impl JournalWriter {
    pub fn new(rx: mpsc::Receiver<RunEventEnvelope>, store: Arc<dyn JournalStore>) -> Self {
        Self { rx, store }
    }

    /// Run the writer, consuming events until the channel is closed
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        tracing::info!("Journal writer started");

        while let Some(envelope) = self.rx.recv().await {
            let record = RunRecord {
                id: 0, // Will be set by database
                timestamp: envelope.timestamp,
                event_type: envelope.event.event_type().to_string(),
                run_id: envelope.event.run_id().map(String::from),
                data: envelope.event,
            };

            if let Err(e) = self.store.insert(&record) {
                tracing::error!("Failed to write journal event: {}", e);
            }
        }

        tracing::info!("Journal writer shutting down");
    }
}

/// Create a complete journal system
///
/// Returns:
/// - `JournalHandle` - for emitting events (clone this to share across tasks)
/// - `JournalWriter` - spawn this as a background task with `tokio::spawn(writer.run())`
pub fn create_journal_system(
    store: Arc<dyn JournalStore>,
    buffer_size: usize,
) -> (JournalHandle, JournalWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let handle = JournalHandle::new(tx);
    let writer = JournalWriter::new(rx, store);
    (handle, writer)
}
