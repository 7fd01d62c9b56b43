//! Core library for the tiered ingestion router.
//!
//! Objects arriving in the stage, curated, or application containers are
//! classified by size, tier, and payload format, routed to a processing
//! unit, and journaled from notification to terminal state.

pub mod config;
pub mod event;
pub mod extractor;
pub mod journal;
pub mod metrics;
pub mod router;
pub mod service;
pub mod store;
pub mod testing;
pub mod unit;
