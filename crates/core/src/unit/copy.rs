use async_trait::async_trait;
use std::sync::Arc;

use super::error::UnitError;
use super::traits::FastUnit;
use super::types::UnitResponse;
use crate::event::IngestionEvent;
use crate::store::ObjectStore;

/// In-process passthrough converter.
///
/// Copies the object byte-for-byte into its destination container under
/// the same key layout. Used as the fallback for converter slots that
/// have no external endpoint configured.
pub struct StoreCopyUnit {
    store: Arc<dyn ObjectStore>,
}

impl StoreCopyUnit {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FastUnit for StoreCopyUnit {
    fn label(&self) -> &str {
        "store_copy"
    }

    async fn invoke(&self, event: &IngestionEvent) -> Result<UnitResponse, UnitError> {
        if !event.has_destination() {
            return Err(UnitError::Transport(format!(
                "event for {} carries no destination",
                event.object_key
            )));
        }

        let object = self.store.get(&event.bucket_name, &event.object_key).await?;
        let dest_key = format!("{}/{}", event.dest_prefix, event.file_name());
        self.store
            .put(
                &event.dest_bucket,
                &dest_key,
                object.body,
                &object.content_type,
            )
            .await?;

        tracing::debug!(
            source = %event.object_key,
            dest_bucket = %event.dest_bucket,
            dest_key = %dest_key,
            "copied object to next tier"
        );

        Ok(UnitResponse::ok(format!(
            "copied {} to {}/{}",
            event.object_key, event.dest_bucket, dest_key
        )))
    }
}
