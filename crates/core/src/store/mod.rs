//! Object store abstraction.
//!
//! The store is the only resource shared across runs: the metadata
//! extractor reads from it, processing units write to it, the router never
//! touches it.

mod memory;
mod traits;
mod types;

pub use memory::MemoryObjectStore;
pub use traits::ObjectStore;
pub use types::{ObjectMeta, StoreError, StoredObject};
