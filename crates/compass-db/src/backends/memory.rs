//! In-memory document store
//!
//! A process-local [`DocumentStore`] backed by `HashMap<String, Vec<Document>>`.
//! Used by the test suites and by `compass-admin` when no database server is
//! configured. Every call is counted per operation, and a failure can be
//! injected for the next call of a given operation, which lets callers assert
//! both query costs and failure propagation.

mod pipeline;
mod query;

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::traits::DocumentStore;
use crate::types::{FindOptions, StoreBackendType, UpdateResult};

/// Store operations tracked by [`MemoryStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
	FindOne,
	FindMany,
	InsertOne,
	UpdateOne,
	UpdateMany,
	DeleteOne,
	CountDocuments,
	Aggregate,
}

impl StoreOperation {
	/// Every tracked operation
	pub const ALL: [StoreOperation; 8] = [
		StoreOperation::FindOne,
		StoreOperation::FindMany,
		StoreOperation::InsertOne,
		StoreOperation::UpdateOne,
		StoreOperation::UpdateMany,
		StoreOperation::DeleteOne,
		StoreOperation::CountDocuments,
		StoreOperation::Aggregate,
	];

	fn index(self) -> usize {
		self as usize
	}
}

impl fmt::Display for StoreOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			StoreOperation::FindOne => "find_one",
			StoreOperation::FindMany => "find_many",
			StoreOperation::InsertOne => "insert_one",
			StoreOperation::UpdateOne => "update_one",
			StoreOperation::UpdateMany => "update_many",
			StoreOperation::DeleteOne => "delete_one",
			StoreOperation::CountDocuments => "count_documents",
			StoreOperation::Aggregate => "aggregate",
		};
		f.write_str(name)
	}
}

/// In-memory document store
///
/// Cloning is cheap and clones share the same collections, counters and
/// injected failures.
///
/// # Example
///
/// ```rust
/// use bson::doc;
/// use compass_db::{DocumentStore, MemoryStore, StoreOperation};
///
/// # tokio_test::block_on(async {
/// let store = MemoryStore::new();
/// store.insert_one("tags", doc! { "name": "rust" }).await.unwrap();
///
/// let found = store.find_one("tags", doc! { "name": "rust" }).await.unwrap();
/// assert!(found.is_some());
/// assert_eq!(store.operation_count(StoreOperation::FindOne), 1);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
	counters: Arc<[AtomicU64; 8]>,
	failures: Arc<Mutex<Vec<StoreOperation>>>,
}

impl MemoryStore {
	/// Create an empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of times `operation` was invoked since creation or the last
	/// [`reset_statistics`](Self::reset_statistics)
	pub fn operation_count(&self, operation: StoreOperation) -> u64 {
		self.counters[operation.index()].load(Ordering::Relaxed)
	}

	/// Total number of store calls, across all operations
	pub fn total_operations(&self) -> u64 {
		StoreOperation::ALL
			.iter()
			.map(|operation| self.operation_count(*operation))
			.sum()
	}

	/// Reset every operation counter to zero
	pub fn reset_statistics(&self) {
		for counter in self.counters.iter() {
			counter.store(0, Ordering::Relaxed);
		}
	}

	/// Make the next call of `operation` fail with a connection error
	///
	/// Injected failures are consumed in order; queueing the same operation
	/// twice fails its next two calls.
	pub fn fail_next(&self, operation: StoreOperation) {
		self.failures.lock().push(operation);
	}

	/// Insert documents without going through the counted operations
	///
	/// Documents without an `_id` get a fresh `ObjectId`.
	pub async fn seed(&self, collection: &str, documents: impl IntoIterator<Item = Document>) {
		let mut collections = self.collections.write().await;
		let stored = collections.entry(collection.to_string()).or_default();
		for mut document in documents {
			ensure_id(&mut document);
			stored.push(document);
		}
	}

	/// Snapshot of a collection in insertion order
	pub async fn documents(&self, collection: &str) -> Vec<Document> {
		self.collections
			.read()
			.await
			.get(collection)
			.cloned()
			.unwrap_or_default()
	}

	fn begin(&self, operation: StoreOperation, collection: &str) -> Result<()> {
		self.counters[operation.index()].fetch_add(1, Ordering::Relaxed);

		let mut failures = self.failures.lock();
		if let Some(position) = failures.iter().position(|queued| *queued == operation) {
			failures.remove(position);
			tracing::trace!(%operation, collection, "injected failure");
			return Err(StoreError::ConnectionError(format!(
				"injected {} failure",
				operation
			)));
		}

		tracing::trace!(%operation, collection, "memory store operation");
		Ok(())
	}
}

fn ensure_id(document: &mut Document) -> Bson {
	if let Some(id) = document.get("_id") {
		return id.clone();
	}
	let id = Bson::ObjectId(ObjectId::new());
	document.insert("_id", id.clone());
	id
}

fn render_id(id: &Bson) -> String {
	match id {
		Bson::ObjectId(oid) => oid.to_hex(),
		Bson::String(s) => s.clone(),
		other => other.to_string(),
	}
}

#[async_trait]
impl DocumentStore for MemoryStore {
	fn backend_type(&self) -> StoreBackendType {
		StoreBackendType::Memory
	}

	async fn health_check(&self) -> Result<()> {
		Ok(())
	}

	async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
		self.begin(StoreOperation::FindOne, collection)?;

		let collections = self.collections.read().await;
		let Some(documents) = collections.get(collection) else {
			return Ok(None);
		};
		for document in documents {
			if query::matches(document, &filter)? {
				return Ok(Some(document.clone()));
			}
		}
		Ok(None)
	}

	async fn find_many(
		&self,
		collection: &str,
		filter: Document,
		options: FindOptions,
	) -> Result<Vec<Document>> {
		self.begin(StoreOperation::FindMany, collection)?;

		let mut found = Vec::new();
		{
			let collections = self.collections.read().await;
			if let Some(documents) = collections.get(collection) {
				for document in documents {
					if query::matches(document, &filter)? {
						found.push(document.clone());
					}
				}
			}
		}

		if let Some(sort) = &options.sort {
			query::sort_documents(&mut found, sort)?;
		}

		let skip = usize::try_from(options.skip.unwrap_or(0)).unwrap_or(usize::MAX);
		// A zero limit means no limit; a negative one is treated by magnitude
		let limit = match options.limit {
			None | Some(0) => usize::MAX,
			Some(limit) => usize::try_from(limit.unsigned_abs()).unwrap_or(usize::MAX),
		};

		found
			.into_iter()
			.skip(skip)
			.take(limit)
			.map(|document| match &options.projection {
				Some(projection) => query::project(document, projection),
				None => Ok(document),
			})
			.collect()
	}

	async fn insert_one(&self, collection: &str, mut document: Document) -> Result<String> {
		self.begin(StoreOperation::InsertOne, collection)?;

		let id = ensure_id(&mut document);
		let mut collections = self.collections.write().await;
		let stored = collections.entry(collection.to_string()).or_default();
		if stored
			.iter()
			.any(|existing| existing.get("_id").is_some_and(|existing_id| existing_id == &id))
		{
			return Err(StoreError::ExecutionError(format!(
				"duplicate _id {} in {}",
				render_id(&id),
				collection
			)));
		}
		stored.push(document);
		Ok(render_id(&id))
	}

	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<UpdateResult> {
		self.begin(StoreOperation::UpdateOne, collection)?;

		let mut collections = self.collections.write().await;
		let Some(documents) = collections.get_mut(collection) else {
			return Ok(UpdateResult::default());
		};
		for document in documents.iter_mut() {
			if query::matches(document, &filter)? {
				let mut updated = document.clone();
				let modified = query::apply_update(&mut updated, &update)?;
				*document = updated;
				return Ok(UpdateResult::new(1, u64::from(modified), 0, None));
			}
		}
		Ok(UpdateResult::default())
	}

	async fn update_many(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<UpdateResult> {
		self.begin(StoreOperation::UpdateMany, collection)?;

		let mut collections = self.collections.write().await;
		let Some(documents) = collections.get_mut(collection) else {
			return Ok(UpdateResult::default());
		};

		let mut result = UpdateResult::default();
		for document in documents.iter_mut() {
			if query::matches(document, &filter)? {
				let mut updated = document.clone();
				if query::apply_update(&mut updated, &update)? {
					result.modified_count += 1;
				}
				*document = updated;
				result.matched_count += 1;
			}
		}
		Ok(result)
	}

	async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64> {
		self.begin(StoreOperation::DeleteOne, collection)?;

		let mut collections = self.collections.write().await;
		let Some(documents) = collections.get_mut(collection) else {
			return Ok(0);
		};
		for position in 0..documents.len() {
			if query::matches(&documents[position], &filter)? {
				documents.remove(position);
				return Ok(1);
			}
		}
		Ok(0)
	}

	async fn count_documents(&self, collection: &str, filter: Document) -> Result<u64> {
		self.begin(StoreOperation::CountDocuments, collection)?;

		let collections = self.collections.read().await;
		let mut count = 0;
		if let Some(documents) = collections.get(collection) {
			for document in documents {
				if query::matches(document, &filter)? {
					count += 1;
				}
			}
		}
		Ok(count)
	}

	async fn aggregate(&self, collection: &str, pipeline: Vec<Document>) -> Result<Vec<Document>> {
		self.begin(StoreOperation::Aggregate, collection)?;

		let documents = self.documents(collection).await;
		pipeline::run(documents, &pipeline)
	}
}
