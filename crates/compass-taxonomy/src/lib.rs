//! # compass-taxonomy
//!
//! Tag and category management for the Compass solution catalog.
//!
//! Solutions reference tags (`tags: [string]`) and a category
//! (`category: string`) by canonical name. This crate owns the canonical
//! records and keeps the denormalized references consistent with them.
//!
//! ## Features
//!
//! - **Canonicalization**: `"Web Dev!"` and `"web  dev"` both become
//!   `web-dev`; every entry point canonicalizes its input
//! - **Usage counts**: number of *approved* solutions referencing a name,
//!   computed in one aggregation per call regardless of page size
//! - **Guarded delete**: a record in use by an approved solution cannot be
//!   deleted
//! - **Rename cascade**: optionally moves solution references to the new
//!   name before renaming the record
//!
//! ## Quick Start
//!
//! ```rust
//! use bson::doc;
//! use compass_db::MemoryStore;
//! use compass_taxonomy::{ListQuery, TagService};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new();
//! store
//!     .seed("solutions", [doc! { "slug": "kafka-tuning", "review_status": "APPROVED" }])
//!     .await;
//!
//! let tags = TagService::new(Arc::new(store));
//! tags.create("Streaming", None, None).await.unwrap();
//! tags.add_tag_to_solution("kafka-tuning", "streaming").await.unwrap();
//!
//! let page = tags.list(&ListQuery::new()).await.unwrap();
//! assert_eq!(page.total, 1);
//! assert_eq!(page.items[0].usage_count, 1);
//! # });
//! ```

pub mod canonical;
pub mod error;
pub mod models;
pub mod query;
pub mod registry;
pub mod services;
pub mod usage;

pub use canonical::{canonicalize, canonicalize_non_empty, is_canonical};
pub use error::{ConflictReason, Result, TaxonomyError};
pub use models::{
	Category, Page, ReviewStatus, SolutionRef, Tag, TaxonomyEntry, TaxonomyPatch, TaxonomyRecord,
};
pub use query::{DEFAULT_PAGE_SIZE, ListQuery, SortOrder};
pub use registry::{CascadeStep, DEFAULT_MAX_PAGE_SIZE};
pub use services::{CategoryService, TagService};
pub use usage::UsageField;

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::error::{ConflictReason, Result, TaxonomyError};
	pub use crate::models::{Category, Page, Tag, TaxonomyPatch};
	pub use crate::query::{ListQuery, SortOrder};
	pub use crate::services::{CategoryService, TagService};
}
