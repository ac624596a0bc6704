//! Value types shared by every document store backend

use bson::Document;
use std::fmt;

/// Identifies the concrete backend behind a [`DocumentStore`](crate::DocumentStore)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreBackendType {
	/// Process-local store, used by tests and local tooling
	Memory,
	/// MongoDB server, replica set or sharded cluster
	MongoDB,
}

impl fmt::Display for StoreBackendType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StoreBackendType::Memory => write!(f, "memory"),
			StoreBackendType::MongoDB => write!(f, "mongodb"),
		}
	}
}

/// Options for `find_many` queries
///
/// # Example
///
/// ```rust
/// use bson::doc;
/// use compass_db::FindOptions;
///
/// let options = FindOptions::new()
///     .sort(doc! { "name": 1 })
///     .skip(20)
///     .limit(10);
/// assert_eq!(options.limit, Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
	/// Sort specification, `{ field: 1 | -1 }` in priority order
	pub sort: Option<Document>,
	/// Number of matching documents to skip
	pub skip: Option<u64>,
	/// Maximum number of documents to return
	pub limit: Option<i64>,
	/// Field projection, inclusion (`1`) or exclusion (`0`) style
	pub projection: Option<Document>,
	/// Cursor batch size hint
	pub batch_size: Option<u32>,
}

impl FindOptions {
	/// Create empty find options (no sort, skip, limit or projection)
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the sort specification
	pub fn sort(mut self, sort: Document) -> Self {
		self.sort = Some(sort);
		self
	}

	/// Set the number of documents to skip
	pub fn skip(mut self, skip: u64) -> Self {
		self.skip = Some(skip);
		self
	}

	/// Set the maximum number of documents to return
	pub fn limit(mut self, limit: i64) -> Self {
		self.limit = Some(limit);
		self
	}

	/// Set the field projection
	pub fn projection(mut self, projection: Document) -> Self {
		self.projection = Some(projection);
		self
	}

	/// Set the cursor batch size
	pub fn batch_size(mut self, batch_size: u32) -> Self {
		self.batch_size = Some(batch_size);
		self
	}
}

/// Outcome of an `update_one` / `update_many` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResult {
	/// Number of documents matched by the filter
	pub matched_count: u64,
	/// Number of documents actually changed
	pub modified_count: u64,
	/// Number of documents inserted by an upsert
	pub upserted_count: u64,
	/// Identifier of the upserted document, if any
	pub upserted_id: Option<String>,
}

impl UpdateResult {
	/// Create a new update result
	pub fn new(
		matched_count: u64,
		modified_count: u64,
		upserted_count: u64,
		upserted_id: Option<String>,
	) -> Self {
		Self {
			matched_count,
			modified_count,
			upserted_count,
			upserted_id,
		}
	}

	/// Returns `true` if the filter matched at least one document
	pub fn matched(&self) -> bool {
		self.matched_count > 0
	}
}
