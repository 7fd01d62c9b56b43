use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel used for destination fields when the event's tier is terminal.
pub const NOT_APPLICABLE: &str = "N/A";

/// Errors raised when an event cannot be placed on the routing axes.
///
/// There is deliberately no default tier or format: an event that does not
/// classify fails the run at the first decision state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassifyError {
    /// No tier literal found in the container name.
    #[error("container {container:?} does not match any tier")]
    UnknownTier { container: String },

    /// No `type=<format>` segment found in the object key.
    #[error("object key {object_key:?} carries no recognized format segment")]
    UnknownFormat { object_key: String },
}

/// One of the three ordered storage stages an object passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Stage,
    Curated,
    Application,
}

impl Tier {
    /// Derive the tier from a container identifier.
    ///
    /// Case-insensitive substring match on the tier literals; the first
    /// match in stage/curated/application order wins.
    pub fn from_container(container: &str) -> Option<Tier> {
        let lower = container.to_lowercase();
        if lower.contains("stage") {
            Some(Tier::Stage)
        } else if lower.contains("curated") {
            Some(Tier::Curated)
        } else if lower.contains("application") {
            Some(Tier::Application)
        } else {
            None
        }
    }

    /// The tier an object moves to after processing, if any.
    pub fn next(&self) -> Option<Tier> {
        match self {
            Tier::Stage => Some(Tier::Curated),
            Tier::Curated => Some(Tier::Application),
            Tier::Application => None,
        }
    }

    /// The application tier has no onward hop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Tier::Application)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Stage => "stage",
            Tier::Curated => "curated",
            Tier::Application => "application",
        }
    }
}

/// Classification of an object's payload shape, inferred from its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    Structured,
    SemiStructured,
    Unstructured,
}

impl DataFormat {
    /// Derive the format from the `type=<format>` path segment convention.
    ///
    /// Matches whole segments only, so `type=structured` never matches a
    /// key carrying `type=semi-structured`.
    pub fn from_object_key(key: &str) -> Option<DataFormat> {
        for segment in key.split('/') {
            match segment {
                "type=structured" => return Some(DataFormat::Structured),
                "type=semi-structured" => return Some(DataFormat::SemiStructured),
                "type=unstructured" => return Some(DataFormat::Unstructured),
                _ => {}
            }
        }
        None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Structured => "structured",
            DataFormat::SemiStructured => "semi_structured",
            DataFormat::Unstructured => "unstructured",
        }
    }
}

/// Raw object-created notification consumed by the metadata extractor.
///
/// Only the container and the URL-encoded key are trusted; size and
/// content-type are re-fetched from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalNotification {
    pub container: String,
    pub object_key_encoded: String,
}

/// The unit of work flowing into the router.
///
/// Wire contract between extractor and router; the JSON field names must
/// stay exactly as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionEvent {
    pub bucket_name: String,
    pub bucket_name_lower: String,
    pub object_key: String,
    pub content_type: String,
    pub file_size: u64,
    pub dest_bucket: String,
    pub dest_prefix: String,
}

impl IngestionEvent {
    /// Tier the object landed in, derived from the container identifier.
    pub fn tier(&self) -> Result<Tier, ClassifyError> {
        Tier::from_container(&self.bucket_name_lower).ok_or_else(|| ClassifyError::UnknownTier {
            container: self.bucket_name_lower.clone(),
        })
    }

    /// Payload format, derived from the object key.
    pub fn data_format(&self) -> Result<DataFormat, ClassifyError> {
        DataFormat::from_object_key(&self.object_key).ok_or_else(|| {
            ClassifyError::UnknownFormat {
                object_key: self.object_key.clone(),
            }
        })
    }

    /// Whether the destination fields carry the terminal-tier sentinel.
    pub fn has_destination(&self) -> bool {
        self.dest_bucket != NOT_APPLICABLE
    }

    /// Final path segment of the object key.
    pub fn file_name(&self) -> &str {
        self.object_key
            .rsplit('/')
            .next()
            .unwrap_or(&self.object_key)
    }
}
