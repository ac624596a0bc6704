//! Document store backends
//!
//! - `memory`: process-local store with operation counters and failure
//!   injection
//! - `mongodb`: MongoDB driver backed store (requires the `mongodb` feature)

pub mod memory;

#[cfg(feature = "mongodb")]
pub mod mongodb;
