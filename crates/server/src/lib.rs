//! HTTP server for the tiered ingestion router.

pub mod api;
pub mod metrics;
pub mod state;
