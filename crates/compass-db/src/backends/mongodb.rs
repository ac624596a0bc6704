//! MongoDB document store
//!
//! Available with the `mongodb` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use compass_db::{DocumentStore, MongoStore};
//! use bson::doc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MongoStore::builder()
//!     .url("mongodb://localhost:27017")
//!     .database("compass")
//!     .build()
//!     .await?;
//!
//! store.health_check().await?;
//! let tag = store.find_one("tags", doc! { "name": "rust" }).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bson::{Bson, Document};
use mongodb::{Client, Database};

use crate::error::{Result, StoreError};
use crate::traits::DocumentStore;
use crate::types::{FindOptions, StoreBackendType, UpdateResult};

/// MongoDB-backed [`DocumentStore`]
///
/// The driver client pools connections internally; cloning a `MongoStore`
/// shares the pool.
#[derive(Clone, Debug)]
pub struct MongoStore {
	client: Client,
	database_name: String,
}

/// Builder for configuring MongoDB connections
///
/// # Example
///
/// ```rust,no_run
/// use compass_db::MongoStoreBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MongoStoreBuilder::new()
///     .url("mongodb://localhost:27017")
///     .database("compass")
///     .max_pool_size(100)
///     .min_pool_size(10)
///     .max_idle_time_secs(300)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MongoStoreBuilder {
	url: String,
	database: String,
	max_pool_size: Option<u32>,
	min_pool_size: Option<u32>,
	max_idle_time_secs: Option<u64>,
}

impl Default for MongoStoreBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl MongoStoreBuilder {
	/// Create a builder targeting `mongodb://localhost:27017`, database `compass`
	pub fn new() -> Self {
		Self {
			url: "mongodb://localhost:27017".to_string(),
			database: "compass".to_string(),
			max_pool_size: None,
			min_pool_size: None,
			max_idle_time_secs: None,
		}
	}

	/// Set the MongoDB connection URL
	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.url = url.into();
		self
	}

	/// Set the database name
	pub fn database(mut self, database: impl Into<String>) -> Self {
		self.database = database.into();
		self
	}

	/// Set the maximum connection pool size
	pub fn max_pool_size(mut self, size: u32) -> Self {
		self.max_pool_size = Some(size);
		self
	}

	/// Set the minimum connection pool size
	pub fn min_pool_size(mut self, size: u32) -> Self {
		self.min_pool_size = Some(size);
		self
	}

	/// Set how long an idle pooled connection is kept
	pub fn max_idle_time_secs(mut self, secs: u64) -> Self {
		self.max_idle_time_secs = Some(secs);
		self
	}

	/// Build the store
	///
	/// Parses the URL and creates the driver client. No round-trip to the
	/// server happens here; use [`DocumentStore::health_check`] for that.
	pub async fn build(self) -> Result<MongoStore> {
		use mongodb::options::ClientOptions;
		use std::time::Duration;

		let mut options = ClientOptions::parse(&self.url)
			.await
			.map_err(|e| StoreError::ConnectionError(e.to_string()))?;

		if let Some(max_size) = self.max_pool_size {
			options.max_pool_size = Some(max_size);
		}
		if let Some(min_size) = self.min_pool_size {
			options.min_pool_size = Some(min_size);
		}
		if let Some(idle_time) = self.max_idle_time_secs {
			options.max_idle_time = Some(Duration::from_secs(idle_time));
		}

		let client = Client::with_options(options)
			.map_err(|e| StoreError::ConnectionError(e.to_string()))?;

		tracing::debug!(database = %self.database, "mongodb client created");

		Ok(MongoStore {
			client,
			database_name: self.database,
		})
	}
}

impl MongoStore {
	/// Create a builder for configuring the connection
	pub fn builder() -> MongoStoreBuilder {
		MongoStoreBuilder::new()
	}

	/// Connect to `url` using the `compass` database
	pub async fn connect(url: &str) -> Result<Self> {
		MongoStoreBuilder::new().url(url).build().await
	}

	/// Switch to another database on the same client
	pub fn with_database(mut self, database_name: &str) -> Self {
		self.database_name = database_name.to_string();
		self
	}

	/// Name of the database this store operates on
	pub fn database_name(&self) -> &str {
		&self.database_name
	}

	fn database(&self) -> Database {
		self.client.database(&self.database_name)
	}

	fn collection(&self, name: &str) -> mongodb::Collection<Document> {
		self.database().collection::<Document>(name)
	}
}

#[async_trait]
impl DocumentStore for MongoStore {
	fn backend_type(&self) -> StoreBackendType {
		StoreBackendType::MongoDB
	}

	async fn health_check(&self) -> Result<()> {
		self.database()
			.run_command(bson::doc! { "ping": 1 })
			.await
			.map_err(|e| StoreError::ConnectionError(format!("Health check failed: {}", e)))?;
		Ok(())
	}

	async fn close(&self) -> Result<()> {
		tracing::debug!(database = %self.database_name, "shutting down mongodb client");
		self.client.clone().shutdown().await;
		Ok(())
	}

	async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
		tracing::debug!(collection, ?filter, "find_one");
		Ok(self.collection(collection).find_one(filter).await?)
	}

	async fn find_many(
		&self,
		collection: &str,
		filter: Document,
		options: FindOptions,
	) -> Result<Vec<Document>> {
		use futures::stream::TryStreamExt;

		tracing::debug!(collection, ?filter, ?options, "find_many");

		let mut mongo_options = mongodb::options::FindOptions::default();
		mongo_options.limit = options.limit;
		mongo_options.skip = options.skip;
		mongo_options.sort = options.sort;
		mongo_options.projection = options.projection;
		mongo_options.batch_size = options.batch_size;

		let cursor = self
			.collection(collection)
			.find(filter)
			.with_options(mongo_options)
			.await?;

		Ok(cursor.try_collect().await?)
	}

	async fn insert_one(&self, collection: &str, document: Document) -> Result<String> {
		tracing::debug!(collection, "insert_one");

		let result = self.collection(collection).insert_one(document).await?;

		Ok(match result.inserted_id {
			Bson::ObjectId(oid) => oid.to_hex(),
			Bson::String(s) => s,
			other => other.to_string(),
		})
	}

	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<UpdateResult> {
		tracing::debug!(collection, ?filter, ?update, "update_one");

		let result = self.collection(collection).update_one(filter, update).await?;
		Ok(convert_update_result(result))
	}

	async fn update_many(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<UpdateResult> {
		tracing::debug!(collection, ?filter, ?update, "update_many");

		let result = self
			.collection(collection)
			.update_many(filter, update)
			.await?;
		Ok(convert_update_result(result))
	}

	async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64> {
		tracing::debug!(collection, ?filter, "delete_one");

		let result = self.collection(collection).delete_one(filter).await?;
		Ok(result.deleted_count)
	}

	async fn count_documents(&self, collection: &str, filter: Document) -> Result<u64> {
		tracing::debug!(collection, ?filter, "count_documents");

		Ok(self.collection(collection).count_documents(filter).await?)
	}

	async fn aggregate(&self, collection: &str, pipeline: Vec<Document>) -> Result<Vec<Document>> {
		use futures::stream::TryStreamExt;

		tracing::debug!(collection, stages = pipeline.len(), "aggregate");

		let cursor = self.collection(collection).aggregate(pipeline).await?;
		Ok(cursor.try_collect().await?)
	}
}

fn convert_update_result(result: mongodb::results::UpdateResult) -> UpdateResult {
	let upserted_id = result.upserted_id.map(|id| match id {
		Bson::ObjectId(oid) => oid.to_hex(),
		Bson::String(s) => s,
		other => other.to_string(),
	});
	UpdateResult::new(
		result.matched_count,
		result.modified_count,
		u64::from(upserted_id.is_some()),
		upserted_id,
	)
}
