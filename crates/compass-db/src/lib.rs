//! # Compass Database
//!
//! Document store abstraction for Compass.
//!
//! The taxonomy core only needs a small capability from its database:
//! find, insert, update and delete by filter, count, and aggregate. This
//! crate defines that capability as the [`DocumentStore`] trait and ships two
//! backends:
//!
//! - **[`MemoryStore`]**: process-local, with per-operation call counters and
//!   one-shot failure injection for tests
//! - **`MongoStore`**: MongoDB driver backed, behind the `mongodb` feature
//!
//! ## Features
//!
//! - `mongodb`: enables the MongoDB backend (`MongoStore`, `MongoStoreBuilder`)
//!
//! ## Quick Start
//!
//! ```rust
//! use bson::doc;
//! use compass_db::{DocumentStore, FindOptions, MemoryStore};
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new();
//! store.insert_one("tags", doc! { "name": "rust" }).await.unwrap();
//! store.insert_one("tags", doc! { "name": "async" }).await.unwrap();
//!
//! let tags = store
//!     .find_many("tags", doc! {}, FindOptions::new().sort(doc! { "name": 1 }))
//!     .await
//!     .unwrap();
//! assert_eq!(tags[0].get_str("name").unwrap(), "async");
//! # });
//! ```

pub mod backends;
pub mod error;
pub mod traits;
pub mod types;

pub use backends::memory::{MemoryStore, StoreOperation};
#[cfg(feature = "mongodb")]
pub use backends::mongodb::{MongoStore, MongoStoreBuilder};
pub use error::{Result, StoreError};
pub use traits::DocumentStore;
pub use types::{FindOptions, StoreBackendType, UpdateResult};

/// Re-export of the BSON crate used in every store signature
pub use bson;
