//! Processing units invoked by the router.
//!
//! A unit moves one object forward: converters rewrite it into the next
//! tier, the warehouse load pushes terminal-tier objects into the
//! analytical store. Fast units are awaited inline; batch units wrap a
//! long-running job that is started and polled to completion.

mod catalog;
mod copy;
mod error;
mod http;
mod traits;
mod types;
mod warehouse;

pub use catalog::*;
pub use copy::*;
pub use error::*;
pub use http::*;
pub use traits::*;
pub use types::*;
pub use warehouse::*;
