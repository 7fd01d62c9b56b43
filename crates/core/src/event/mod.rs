//! The data model flowing through the ingestion pipeline.
//!
//! An object landing in a tier bucket produces an [`ArrivalNotification`],
//! which the metadata extractor turns into one [`IngestionEvent`]. The
//! event's JSON shape is the wire contract between extractor and router
//! and is preserved field-for-field.

mod types;

pub use types::*;
