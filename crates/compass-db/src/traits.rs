//! Document store traits
//!
//! - `DocumentStore`: async capability over a document database, consumed by
//!   the taxonomy services

mod document;

pub use document::DocumentStore;
