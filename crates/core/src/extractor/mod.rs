//! Metadata extraction.
//!
//! Turns a raw arrival notification into a fully populated ingestion
//! event: the key is URL-decoded, size and content type are re-fetched
//! from the store, and the destination container is derived from the
//! tier mapping.

use std::sync::Arc;
use thiserror::Error;

use crate::config::TierConfig;
use crate::event::{ArrivalNotification, IngestionEvent, Tier, NOT_APPLICABLE};
use crate::store::{ObjectStore, StoreError};

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The notification's key could not be URL-decoded.
    #[error("invalid object key {object_key_encoded:?}: {detail}")]
    InvalidKey {
        object_key_encoded: String,
        detail: String,
    },

    /// The container name matches no configured tier.
    #[error("container {container:?} does not match any tier")]
    UnknownTier { container: String },

    /// The object could not be described by the store.
    #[error("object {key:?} in {bucket:?} unavailable: {source}")]
    ObjectUnavailable {
        bucket: String,
        key: String,
        source: StoreError,
    },
}

/// Decode an object key as it appears in arrival notifications.
///
/// Notification keys encode spaces as `+` on top of percent-encoding.
fn decode_object_key(encoded: &str) -> Result<String, ExtractError> {
    let plus_decoded = encoded.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(|s| s.into_owned())
        .map_err(|e| ExtractError::InvalidKey {
            object_key_encoded: encoded.to_string(),
            detail: e.to_string(),
        })
}

/// Builds ingestion events from arrival notifications.
pub struct MetadataExtractor {
    store: Arc<dyn ObjectStore>,
    tiers: TierConfig,
}

impl MetadataExtractor {
    pub fn new(store: Arc<dyn ObjectStore>, tiers: TierConfig) -> Self {
        Self { store, tiers }
    }

    /// Extract the full event for a notification.
    ///
    /// Size and content type come from a fresh store lookup, never from
    /// the notification itself.
    pub async fn extract(
        &self,
        notification: &ArrivalNotification,
    ) -> Result<IngestionEvent, ExtractError> {
        let object_key = decode_object_key(&notification.object_key_encoded)?;
        let container = &notification.container;
        let container_lower = container.to_lowercase();

        let tier =
            Tier::from_container(&container_lower).ok_or_else(|| ExtractError::UnknownTier {
                container: container.clone(),
            })?;

        let meta = self
            .store
            .head(container, &object_key)
            .await
            .map_err(|e| ExtractError::ObjectUnavailable {
                bucket: container.clone(),
                key: object_key.clone(),
                source: e,
            })?;

        let (dest_bucket, dest_prefix) = match self.tiers.destination_for(tier) {
            Some(dest) => (dest.to_string(), key_prefix(&object_key)),
            None => (NOT_APPLICABLE.to_string(), NOT_APPLICABLE.to_string()),
        };

        Ok(IngestionEvent {
            bucket_name: container.clone(),
            bucket_name_lower: container_lower,
            object_key,
            content_type: meta.content_type,
            file_size: meta.size_bytes,
            dest_bucket,
            dest_prefix,
        })
    }
}

/// The key minus its final segment.
fn key_prefix(key: &str) -> String {
    match key.rsplit_once('/') {
        Some((prefix, _)) => prefix.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryObjectStore;

    fn tiers() -> TierConfig {
        TierConfig {
            stage: "my-stage-bucket".to_string(),
            curated: "my-curated-bucket".to_string(),
            application: "my-application-bucket".to_string(),
        }
    }

    async fn extractor_with_object(
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> MetadataExtractor {
        let store = Arc::new(MemoryObjectStore::new());
        store
            .put(bucket, key, b"payload".to_vec(), content_type)
            .await
            .unwrap();
        MetadataExtractor::new(store, tiers())
    }

    #[test]
    fn test_decode_object_key() {
        assert_eq!(
            decode_object_key("claims/type%3Dstructured/f.csv").unwrap(),
            "claims/type=structured/f.csv"
        );
        assert_eq!(
            decode_object_key("lab+results/f.csv").unwrap(),
            "lab results/f.csv"
        );
    }

    #[tokio::test]
    async fn test_extract_stage_event() {
        let extractor = extractor_with_object(
            "My-Stage-Bucket",
            "claims/type=structured/2024/f.csv",
            "text/csv",
        )
        .await;

        let event = extractor
            .extract(&ArrivalNotification {
                container: "My-Stage-Bucket".to_string(),
                object_key_encoded: "claims/type%3Dstructured/2024/f.csv".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(event.bucket_name, "My-Stage-Bucket");
        assert_eq!(event.bucket_name_lower, "my-stage-bucket");
        assert_eq!(event.object_key, "claims/type=structured/2024/f.csv");
        assert_eq!(event.content_type, "text/csv");
        assert_eq!(event.file_size, 7);
        assert_eq!(event.dest_bucket, "my-curated-bucket");
        assert_eq!(event.dest_prefix, "claims/type=structured/2024");
    }

    #[tokio::test]
    async fn test_extract_terminal_tier_uses_sentinel() {
        let extractor = extractor_with_object(
            "my-application-bucket",
            "claims/model/fact/part-0.parquet",
            "application/parquet",
        )
        .await;

        let event = extractor
            .extract(&ArrivalNotification {
                container: "my-application-bucket".to_string(),
                object_key_encoded: "claims/model/fact/part-0.parquet".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(event.dest_bucket, NOT_APPLICABLE);
        assert_eq!(event.dest_prefix, NOT_APPLICABLE);
        assert!(!event.has_destination());
    }

    #[tokio::test]
    async fn test_extract_unknown_container_fails() {
        let extractor =
            extractor_with_object("random-bucket", "claims/f.csv", "text/csv").await;

        let err = extractor
            .extract(&ArrivalNotification {
                container: "random-bucket".to_string(),
                object_key_encoded: "claims/f.csv".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::UnknownTier { .. }));
    }

    #[tokio::test]
    async fn test_extract_missing_object_fails() {
        let store = Arc::new(MemoryObjectStore::new());
        let extractor = MetadataExtractor::new(store, tiers());

        let err = extractor
            .extract(&ArrivalNotification {
                container: "my-stage-bucket".to_string(),
                object_key_encoded: "claims/missing.csv".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::ObjectUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_extract_decodes_plus_and_percent() {
        let extractor = extractor_with_object(
            "my-stage-bucket",
            "lab results/type=unstructured/scan 1.jpeg",
            "image/jpeg",
        )
        .await;

        let event = extractor
            .extract(&ArrivalNotification {
                container: "my-stage-bucket".to_string(),
                object_key_encoded: "lab+results/type%3Dunstructured/scan+1.jpeg".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(event.object_key, "lab results/type=unstructured/scan 1.jpeg");
    }

    #[test]
    fn test_key_prefix() {
        assert_eq!(key_prefix("a/b/c.csv"), "a/b");
        assert_eq!(key_prefix("c.csv"), "");
    }
}
