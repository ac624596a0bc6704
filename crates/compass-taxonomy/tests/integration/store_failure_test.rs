//! Store failures propagate unchanged

use compass_db::{MemoryStore, StoreError, StoreOperation};
use compass_taxonomy::{ListQuery, TaxonomyError};
use rstest::rstest;

use crate::fixtures::{approved, create_tags, seed_solutions, store, tag_service};

#[rstest]
#[case(StoreOperation::FindOne)]
#[case(StoreOperation::InsertOne)]
#[tokio::test]
async fn test_create_propagates_store_failure(store: MemoryStore, #[case] operation: StoreOperation) {
	// Arrange
	let tags = tag_service(&store);
	store.fail_next(operation);

	// Act
	let result = tags.create("rust", None, None).await;

	// Assert
	assert!(matches!(
		result,
		Err(TaxonomyError::StoreUnavailable(StoreError::ConnectionError(_)))
	));
	assert!(store.documents("tags").await.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_list_propagates_aggregation_failure(store: MemoryStore) {
	// Arrange
	let tags = tag_service(&store);
	create_tags(&tags, &["rust"]).await;
	store.fail_next(StoreOperation::Aggregate);

	// Act
	let result = tags.list(&ListQuery::new().include_unused(true)).await;

	// Assert
	assert!(matches!(result, Err(TaxonomyError::StoreUnavailable(_))));
}

#[rstest]
#[tokio::test]
async fn test_delete_check_failure_deletes_nothing(store: MemoryStore) {
	// Arrange
	let tags = tag_service(&store);
	create_tags(&tags, &["rust"]).await;
	seed_solutions(&store, [approved("s1", &[])]).await;
	store.fail_next(StoreOperation::CountDocuments);

	// Act
	let result = tags.delete("rust").await;

	// Assert
	assert!(matches!(result, Err(TaxonomyError::StoreUnavailable(_))));
	assert_eq!(store.operation_count(StoreOperation::DeleteOne), 0);
	assert!(tags.get_by_name("rust").await.unwrap().is_some());
}

#[rstest]
#[tokio::test]
async fn test_no_internal_retry(store: MemoryStore) {
	// Arrange
	let tags = tag_service(&store);
	store.fail_next(StoreOperation::FindOne);

	// Act
	let result = tags.get_by_name("rust").await;

	// Assert
	assert!(result.is_err());
	assert_eq!(store.operation_count(StoreOperation::FindOne), 1);
}
