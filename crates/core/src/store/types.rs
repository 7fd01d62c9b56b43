use thiserror::Error;

/// Errors raised by object store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object does not exist.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Backend failure (network, permissions, corruption).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Authoritative object metadata, as reported by the store itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Object size in bytes.
    pub size_bytes: u64,
    /// MIME content type; informational only.
    pub content_type: String,
}

/// A stored object: payload plus metadata.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

impl StoredObject {
    pub fn meta(&self) -> ObjectMeta {
        ObjectMeta {
            size_bytes: self.body.len() as u64,
            content_type: self.content_type.clone(),
        }
    }
}
