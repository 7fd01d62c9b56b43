//! The routing core.
//!
//! An ingestion event is classified on three axes (size, tier, format)
//! by an explicit state machine, the matching processing unit is invoked,
//! and the run ends in exactly one terminal state. Classification never
//! falls through to a default: an event that does not classify fails.

mod decision;
mod machine;
mod runner;
mod types;

pub use decision::*;
pub use machine::*;
pub use runner::*;
pub use types::*;
