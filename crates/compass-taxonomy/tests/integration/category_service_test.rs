//! CategoryService behavior

use bson::doc;
use compass_db::{DocumentStore, MemoryStore, StoreOperation};
use compass_taxonomy::{ConflictReason, ListQuery, TaxonomyError, TaxonomyPatch};
use rstest::rstest;

use crate::fixtures::{
	approved_in, category_service, create_categories, references, seed_solutions, solution, store,
};

#[rstest]
#[tokio::test]
async fn test_create_and_get_category(store: MemoryStore) {
	// Arrange
	let categories = category_service(&store);

	// Act
	let created = categories
		.create("Data Engineering", Some("Pipelines".into()), Some("dana"))
		.await
		.unwrap();
	let duplicate = categories.create("data engineering", None, None).await;
	let fetched = categories.get_by_name("DATA-ENGINEERING").await.unwrap();

	// Assert
	assert_eq!(created.name, "data-engineering");
	assert_eq!(fetched, Some(created));
	assert_eq!(
		duplicate.unwrap_err().conflict_reason(),
		Some(ConflictReason::AlreadyExists)
	);
}

#[rstest]
#[tokio::test]
async fn test_category_usage_counts_group_scalar_field(store: MemoryStore) {
	// Arrange
	seed_solutions(
		&store,
		[
			approved_in("s1", "data"),
			approved_in("s2", "data"),
			approved_in("s3", "web"),
			solution("s4", &[], Some("web"), "REJECTED"),
			solution("s5", &[], None, "APPROVED"),
		],
	)
	.await;
	let categories = category_service(&store);

	// Act
	let all = categories.usage_counts(None).await.unwrap();
	let only_web = categories
		.usage_counts(Some(["web".to_string()].as_slice()))
		.await
		.unwrap();

	// Assert
	assert_eq!(all.len(), 2);
	assert_eq!(all["data"], 2);
	assert_eq!(all["web"], 1);
	assert_eq!(only_web.len(), 1);
	assert_eq!(store.operation_count(StoreOperation::Aggregate), 2);
}

#[rstest]
#[tokio::test]
async fn test_category_listing(store: MemoryStore) {
	// Arrange
	let categories = category_service(&store);
	create_categories(&categories, &["ops", "data", "web"]).await;
	seed_solutions(&store, [approved_in("s1", "web"), approved_in("s2", "web")]).await;

	// Act
	let used = categories.list(&ListQuery::new()).await.unwrap();
	let all = categories
		.list(&ListQuery::new().include_unused(true))
		.await
		.unwrap();

	// Assert
	assert_eq!(used.names(), vec!["web"]);
	assert_eq!(used.items[0].usage_count, 2);
	assert_eq!(used.total, 1);
	assert_eq!(all.names(), vec!["data", "ops", "web"]);
	assert_eq!(all.total, 3);
	assert_eq!(categories.count(false).await.unwrap(), 1);
}

#[rstest]
#[tokio::test]
async fn test_assign_replaces_and_clear_requires_match(store: MemoryStore) {
	// Arrange
	let categories = category_service(&store);
	create_categories(&categories, &["data", "web"]).await;
	seed_solutions(&store, [approved_in("s1", "data")]).await;

	// Act
	let assigned = categories.assign_to_solution("s1", "Web").await.unwrap();
	let wrong_clear = categories.clear_from_solution("s1", "data").await.unwrap();
	let current = categories.solution_category("s1").await.unwrap();
	let cleared = categories.clear_from_solution("s1", "web").await.unwrap();
	let after = categories.solution_category("s1").await.unwrap();

	// Assert
	assert!(assigned);
	assert!(!wrong_clear);
	let current = current.unwrap();
	assert_eq!(current.name, "web");
	assert_eq!(current.usage_count, 1);
	assert!(cleared);
	assert!(after.is_none());
}

#[rstest]
#[tokio::test]
async fn test_assign_unknown_category_is_noop(store: MemoryStore) {
	let categories = category_service(&store);
	seed_solutions(&store, [approved_in("s1", "data")]).await;

	let assigned = categories.assign_to_solution("s1", "ghost").await.unwrap();

	assert!(!assigned);
	assert_eq!(references(&store, "category", "data").await, 1);
}

#[rstest]
#[case("")]
#[case("!!!")]
#[tokio::test]
async fn test_name_without_canonical_form_reads_as_absent(store: MemoryStore, #[case] raw: &str) {
	// Arrange
	let categories = category_service(&store);
	create_categories(&categories, &["data"]).await;
	seed_solutions(&store, [approved_in("s1", "data")]).await;

	// Act
	let fetched = categories.get_by_name(raw).await.unwrap();
	let usage = categories.usage_count(raw).await.unwrap();
	let deleted = categories.delete(raw).await.unwrap();
	let assigned = categories.assign_to_solution("s1", raw).await.unwrap();
	let cleared = categories.clear_from_solution("s1", raw).await.unwrap();
	let renamed = categories
		.update(raw, TaxonomyPatch::new().rename("web"), None, true)
		.await
		.unwrap();

	// Assert
	assert!(fetched.is_none());
	assert_eq!(usage, 0);
	assert!(!deleted);
	assert!(!assigned);
	assert!(!cleared);
	assert!(renamed.is_none());
	assert_eq!(references(&store, "category", "data").await, 1);
	assert_eq!(store.documents("categories").await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_category_delete_guard(store: MemoryStore) {
	// Arrange
	let categories = category_service(&store);
	create_categories(&categories, &["data"]).await;
	seed_solutions(&store, [approved_in("s1", "data")]).await;

	// Act
	let blocked = categories.delete("data").await;
	categories.clear_from_solution("s1", "data").await.unwrap();
	let deleted = categories.delete("data").await.unwrap();
	let again = categories.delete("data").await.unwrap();

	// Assert
	assert!(matches!(
		blocked,
		Err(TaxonomyError::Conflict { reason: ConflictReason::InUse, .. })
	));
	assert!(deleted);
	assert!(!again);
}

#[rstest]
#[tokio::test]
async fn test_category_cascade_rename(store: MemoryStore) {
	// Arrange
	let categories = category_service(&store);
	create_categories(&categories, &["devops"]).await;
	seed_solutions(
		&store,
		[
			approved_in("s1", "devops"),
			solution("s2", &[], Some("devops"), "PENDING"),
			approved_in("s3", "data"),
		],
	)
	.await;

	// Act
	let renamed = categories
		.update("devops", TaxonomyPatch::new().rename("Platform Ops"), Some("erin"), true)
		.await
		.unwrap()
		.unwrap();

	// Assert
	assert_eq!(renamed.name, "platform-ops");
	assert_eq!(renamed.usage_count, 1);
	assert_eq!(references(&store, "category", "devops").await, 0);
	assert_eq!(references(&store, "category", "platform-ops").await, 2);
	assert!(categories.get_by_name("devops").await.unwrap().is_none());
	let s3 = store
		.find_one("solutions", doc! { "slug": "s3" })
		.await
		.unwrap()
		.unwrap();
	assert!(!s3.contains_key("updated_by"));
}
