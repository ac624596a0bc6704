//! CRUD behavior of MemoryStore through the DocumentStore trait

use bson::{Bson, doc};
use compass_db::{DocumentStore, FindOptions, MemoryStore, StoreBackendType, StoreError};
use rstest::*;
use std::sync::Arc;

#[fixture]
fn store() -> MemoryStore {
	MemoryStore::new()
}

async fn seed_tags(store: &MemoryStore, names: &[&str]) {
	store
		.seed("tags", names.iter().map(|name| doc! { "name": *name }))
		.await;
}

#[rstest]
#[tokio::test]
async fn test_insert_assigns_object_id(store: MemoryStore) {
	// Arrange
	let db: Arc<dyn DocumentStore> = Arc::new(store.clone());

	// Act
	let id = db.insert_one("tags", doc! { "name": "rust" }).await.unwrap();

	// Assert
	let stored = store.documents("tags").await;
	assert_eq!(stored.len(), 1);
	assert_eq!(stored[0].get_object_id("_id").unwrap().to_hex(), id);
	assert_eq!(db.backend_type(), StoreBackendType::Memory);
}

#[rstest]
#[tokio::test]
async fn test_insert_keeps_explicit_string_id(store: MemoryStore) {
	// Act
	let id = store
		.insert_one("tags", doc! { "_id": "tag-1", "name": "rust" })
		.await
		.unwrap();
	let duplicate = store
		.insert_one("tags", doc! { "_id": "tag-1", "name": "other" })
		.await;

	// Assert
	assert_eq!(id, "tag-1");
	assert!(matches!(duplicate, Err(StoreError::ExecutionError(_))));
}

#[rstest]
#[tokio::test]
async fn test_find_one_on_missing_collection(store: MemoryStore) {
	let found = store.find_one("nothing", doc! {}).await.unwrap();
	assert!(found.is_none());
}

#[rstest]
#[tokio::test]
async fn test_find_many_sorts_skips_and_limits(store: MemoryStore) {
	// Arrange
	seed_tags(&store, &["delta", "alpha", "echo", "charlie", "bravo"]).await;

	// Act
	let page = store
		.find_many(
			"tags",
			doc! {},
			FindOptions::new().sort(doc! { "name": 1 }).skip(1).limit(2),
		)
		.await
		.unwrap();

	// Assert
	let names: Vec<&str> = page.iter().map(|d| d.get_str("name").unwrap()).collect();
	assert_eq!(names, vec!["bravo", "charlie"]);
}

#[rstest]
#[tokio::test]
async fn test_find_many_without_sort_keeps_insertion_order(store: MemoryStore) {
	// Arrange
	seed_tags(&store, &["b", "a", "c"]).await;

	// Act
	let all = store
		.find_many("tags", doc! { "name": { "$ne": "a" } }, FindOptions::new())
		.await
		.unwrap();

	// Assert
	let names: Vec<&str> = all.iter().map(|d| d.get_str("name").unwrap()).collect();
	assert_eq!(names, vec!["b", "c"]);
}

#[rstest]
#[tokio::test]
async fn test_find_many_applies_projection(store: MemoryStore) {
	// Arrange
	store
		.seed("tags", [doc! { "name": "rust", "description": "language" }])
		.await;

	// Act
	let found = store
		.find_many(
			"tags",
			doc! {},
			FindOptions::new().projection(doc! { "_id": 0, "name": 1 }),
		)
		.await
		.unwrap();

	// Assert
	assert_eq!(found, vec![doc! { "name": "rust" }]);
}

#[rstest]
#[tokio::test]
async fn test_update_one_reports_matched_and_modified(store: MemoryStore) {
	// Arrange
	store
		.seed("solutions", [doc! { "slug": "s1", "tags": ["a"] }])
		.await;

	// Act
	let added = store
		.update_one(
			"solutions",
			doc! { "slug": "s1" },
			doc! { "$addToSet": { "tags": "b" } },
		)
		.await
		.unwrap();
	let repeated = store
		.update_one(
			"solutions",
			doc! { "slug": "s1" },
			doc! { "$addToSet": { "tags": "b" } },
		)
		.await
		.unwrap();
	let missing = store
		.update_one(
			"solutions",
			doc! { "slug": "s2" },
			doc! { "$addToSet": { "tags": "b" } },
		)
		.await
		.unwrap();

	// Assert
	assert_eq!((added.matched_count, added.modified_count), (1, 1));
	assert_eq!((repeated.matched_count, repeated.modified_count), (1, 0));
	assert!(!missing.matched());
}

#[rstest]
#[tokio::test]
async fn test_update_many_touches_every_match(store: MemoryStore) {
	// Arrange
	store
		.seed(
			"solutions",
			[
				doc! { "slug": "s1", "tags": ["old", "x"] },
				doc! { "slug": "s2", "tags": ["old"] },
				doc! { "slug": "s3", "tags": ["x"] },
			],
		)
		.await;

	// Act
	let result = store
		.update_many(
			"solutions",
			doc! { "tags": "old" },
			doc! { "$pull": { "tags": "old" } },
		)
		.await
		.unwrap();

	// Assert
	assert_eq!(result.matched_count, 2);
	assert_eq!(result.modified_count, 2);
	let remaining = store
		.count_documents("solutions", doc! { "tags": "old" })
		.await
		.unwrap();
	assert_eq!(remaining, 0);
}

#[rstest]
#[tokio::test]
async fn test_failed_update_leaves_document_untouched(store: MemoryStore) {
	// Arrange
	store
		.seed("solutions", [doc! { "slug": "s1", "category": "data" }])
		.await;

	// Act
	let result = store
		.update_one(
			"solutions",
			doc! { "slug": "s1" },
			doc! { "$set": { "note": "x" }, "$addToSet": { "category": "y" } },
		)
		.await;

	// Assert
	assert!(matches!(result, Err(StoreError::InvalidOperation(_))));
	let stored = store.documents("solutions").await;
	assert!(!stored[0].contains_key("note"));
	assert_eq!(stored[0].get("category"), Some(&Bson::from("data")));
}

#[rstest]
#[tokio::test]
async fn test_delete_one_removes_first_match(store: MemoryStore) {
	// Arrange
	seed_tags(&store, &["a", "b", "a"]).await;

	// Act
	let deleted = store.delete_one("tags", doc! { "name": "a" }).await.unwrap();
	let none = store.delete_one("tags", doc! { "name": "z" }).await.unwrap();

	// Assert
	assert_eq!(deleted, 1);
	assert_eq!(none, 0);
	assert_eq!(store.count_documents("tags", doc! {}).await.unwrap(), 2);
}

#[rstest]
#[tokio::test]
async fn test_clones_share_state(store: MemoryStore) {
	// Arrange
	let clone = store.clone();

	// Act
	clone.insert_one("tags", doc! { "name": "rust" }).await.unwrap();

	// Assert
	assert_eq!(store.count_documents("tags", doc! {}).await.unwrap(), 1);
	assert!(store.health_check().await.is_ok());
	assert!(store.close().await.is_ok());
}
