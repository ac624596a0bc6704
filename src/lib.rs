//! # Compass
//!
//! Tag and category taxonomy core for the Compass technical solutions
//! catalog.
//!
//! Solutions reference tags and a category by canonical name. This crate
//! re-exports the pieces needed to manage those names:
//!
//! - [`db`]: the `DocumentStore` abstraction with in-memory and MongoDB
//!   backends
//! - [`taxonomy`]: canonicalization, usage counting, `TagService` and
//!   `CategoryService`
//! - [`conf`]: layered settings
//!
//! ## Feature Flags
//!
//! - `mongodb` - MongoDB document store backend
//!
//! ## Quick Example
//!
//! ```rust
//! use compass::db::bson::doc;
//! use compass::prelude::*;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new();
//! store
//!     .seed("solutions", [doc! { "slug": "etl-basics", "review_status": "APPROVED" }])
//!     .await;
//! let categories = CategoryService::new(Arc::new(store));
//!
//! categories.create("Data Engineering", None, Some("alice")).await.unwrap();
//! categories.assign_to_solution("etl-basics", "data engineering").await.unwrap();
//!
//! let category = categories.get_by_name("DATA-ENGINEERING").await.unwrap().unwrap();
//! assert_eq!(category.name, "data-engineering");
//! assert_eq!(category.usage_count, 1);
//! # });
//! ```

/// Document store abstraction and backends
pub mod db {
	pub use compass_db::*;
}

/// Tag and category services
pub mod taxonomy {
	pub use compass_taxonomy::*;
}

/// Layered settings
pub mod conf {
	pub use compass_conf::*;
}

// Re-export settings from dedicated crate
pub use compass_conf::{Settings, SettingsError};

// Re-export store types
pub use compass_db::{DocumentStore, MemoryStore, StoreError};
#[cfg(feature = "mongodb")]
pub use compass_db::{MongoStore, MongoStoreBuilder};

// Re-export taxonomy types
pub use compass_taxonomy::{
	Category, CategoryService, ListQuery, Page, SortOrder, Tag, TagService, TaxonomyError,
	TaxonomyPatch, canonicalize,
};

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::{
		Category, CategoryService, DocumentStore, ListQuery, MemoryStore, Page, Settings, SortOrder,
		StoreError, Tag, TagService, TaxonomyError, TaxonomyPatch, canonicalize,
	};

	#[cfg(feature = "mongodb")]
	pub use crate::MongoStore;
}
