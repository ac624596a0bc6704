//! Document-oriented store trait
//!
//! This module defines the capability the taxonomy core consumes from a
//! document database. It only relies on filtering by equality/membership,
//! simple update operators, grouping and counting.

use async_trait::async_trait;
use bson::Document;

use crate::error::Result;
use crate::types::{FindOptions, StoreBackendType, UpdateResult};

/// Trait for document-oriented stores
///
/// Implementations must be `Send + Sync`: a single handle is shared by every
/// service in the process and used concurrently.
///
/// # Example
///
/// ```rust,ignore
/// use compass_db::DocumentStore;
/// use bson::doc;
///
/// async fn find_tag(db: &dyn DocumentStore, name: &str) -> Result<Option<Document>> {
///     db.find_one("tags", doc! { "name": name }).await
/// }
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Returns the backend type
	fn backend_type(&self) -> StoreBackendType;

	/// Checks connectivity with the underlying store
	async fn health_check(&self) -> Result<()>;

	/// Releases the connection resources held by this handle
	///
	/// Called once by the owner of the handle during teardown. The default
	/// implementation does nothing.
	async fn close(&self) -> Result<()> {
		Ok(())
	}

	/// Finds a single document matching the filter
	///
	/// Returns `Some(Document)` if a matching document is found, `None` otherwise.
	async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

	/// Finds multiple documents matching the filter
	///
	/// # Example
	///
	/// ```rust,ignore
	/// let options = FindOptions::new().limit(10).sort(doc! { "name": 1 });
	/// let tags = db.find_many("tags", doc! {}, options).await?;
	/// ```
	async fn find_many(
		&self,
		collection: &str,
		filter: Document,
		options: FindOptions,
	) -> Result<Vec<Document>>;

	/// Inserts a single document into the collection
	///
	/// Returns the ID of the inserted document as a string.
	async fn insert_one(&self, collection: &str, document: Document) -> Result<String>;

	/// Updates a single document matching the filter
	///
	/// # Example
	///
	/// ```rust,ignore
	/// let result = db.update_one(
	///     "solutions",
	///     doc! { "slug": "kafka-tuning" },
	///     doc! { "$addToSet": { "tags": "streaming" } }
	/// ).await?;
	/// ```
	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<UpdateResult>;

	/// Updates every document matching the filter
	async fn update_many(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<UpdateResult>;

	/// Deletes a single document matching the filter
	///
	/// Returns the number of documents deleted (0 or 1).
	async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64>;

	/// Counts the documents matching the filter
	async fn count_documents(&self, collection: &str, filter: Document) -> Result<u64>;

	/// Executes an aggregation pipeline
	///
	/// # Example
	///
	/// ```rust,ignore
	/// let results = db.aggregate("solutions", vec![
	///     doc! { "$match": { "review_status": "APPROVED" } },
	///     doc! { "$unwind": "$tags" },
	///     doc! { "$group": { "_id": "$tags", "count": { "$sum": 1 } } }
	/// ]).await?;
	/// ```
	async fn aggregate(&self, collection: &str, pipeline: Vec<Document>) -> Result<Vec<Document>>;
}
