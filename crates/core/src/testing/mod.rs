//! Mock implementations for testing.

mod mock_batch_unit;
mod mock_fast_unit;

pub use mock_batch_unit::*;
pub use mock_fast_unit::*;
