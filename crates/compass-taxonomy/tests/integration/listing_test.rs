//! Paginated listing of tags

use compass_db::{MemoryStore, StoreOperation};
use compass_taxonomy::{ListQuery, SortOrder, TaxonomyError};
use rstest::rstest;

use crate::fixtures::{approved, create_tags, pending, seed_solutions, store, tag_service};

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn test_listing_fifty_tags_costs_one_aggregation(store: MemoryStore, #[case] include_unused: bool) {
	// Arrange
	let tags = tag_service(&store);
	let names: Vec<String> = (0..50).map(|i| format!("tag-{:02}", i)).collect();
	for name in &names {
		tags.create(name, None, None).await.unwrap();
	}
	seed_solutions(&store, [approved("s1", &["tag-00", "tag-10", "tag-49"])]).await;
	store.reset_statistics();

	// Act
	let page = tags
		.list(&ListQuery::new().limit(50).include_unused(include_unused))
		.await
		.unwrap();

	// Assert
	assert_eq!(store.operation_count(StoreOperation::Aggregate), 1);
	assert_eq!(store.operation_count(StoreOperation::FindOne), 0);
	if include_unused {
		assert_eq!(page.items.len(), 50);
		assert_eq!(page.total, 50);
	} else {
		assert_eq!(page.names(), vec!["tag-00", "tag-10", "tag-49"]);
		assert_eq!(page.total, 3);
	}
}

#[rstest]
#[tokio::test]
async fn test_listing_orders_by_canonical_name(store: MemoryStore) {
	// Arrange
	let tags = tag_service(&store);
	create_tags(&tags, &["Zig", "ada", "C Sharp", "basic"]).await;

	// Act
	let page = tags
		.list(&ListQuery::new().include_unused(true))
		.await
		.unwrap();

	// Assert
	assert_eq!(page.names(), vec!["ada", "basic", "c-sharp", "zig"]);
	assert!(page.items.iter().all(|tag| tag.usage_count == 0));
}

#[rstest]
#[tokio::test]
async fn test_unused_filter_applies_after_paging(store: MemoryStore) {
	// Arrange
	let tags = tag_service(&store);
	create_tags(&tags, &["a", "b", "c", "d", "e"]).await;
	seed_solutions(
		&store,
		[approved("s1", &["a", "d"]), approved("s2", &["e"]), pending("s3", &["b"])],
	)
	.await;

	// Act
	let first = tags.list(&ListQuery::new().limit(2)).await.unwrap();
	let second = tags.list(&ListQuery::new().skip(2).limit(2)).await.unwrap();

	// Assert
	assert_eq!(first.names(), vec!["a"]);
	assert_eq!(second.names(), vec!["d"]);
	assert_eq!(first.total, 3);
	assert_eq!(second.total, 3);
	assert_eq!(first.items[0].usage_count, 1);
}

#[rstest]
#[tokio::test]
async fn test_total_ignores_references_without_record(store: MemoryStore) {
	// Arrange
	let tags = tag_service(&store);
	create_tags(&tags, &["a"]).await;
	seed_solutions(&store, [approved("s1", &["a", "orphan"])]).await;

	// Act
	let page = tags.list(&ListQuery::new()).await.unwrap();
	let used = tags.count(false).await.unwrap();
	let all = tags.count(true).await.unwrap();

	// Assert
	assert_eq!(page.total, 1);
	assert_eq!(used, 1);
	assert_eq!(all, 1);
}

#[rstest]
#[tokio::test]
async fn test_listing_sort_orders(store: MemoryStore) {
	// Arrange
	let tags = tag_service(&store);
	create_tags(&tags, &["b", "a", "c"]).await;

	// Act
	let by_name_desc = tags
		.list(&ListQuery::new().include_unused(true).sort(SortOrder::NameDesc))
		.await
		.unwrap();
	let by_created = tags
		.list(&ListQuery::new().include_unused(true).sort(SortOrder::CreatedAsc))
		.await
		.unwrap();

	// Assert
	assert_eq!(by_name_desc.names(), vec!["c", "b", "a"]);
	// Ties on created_at fall back to the name
	let mut created_order = by_created.items.clone();
	created_order.sort_by(|x, y| x.created_at.cmp(&y.created_at).then(x.name.cmp(&y.name)));
	assert_eq!(by_created.items, created_order);
}

#[rstest]
#[tokio::test]
async fn test_zero_limit_is_invalid(store: MemoryStore) {
	let tags = tag_service(&store);

	let result = tags.list(&ListQuery::new().limit(0)).await;

	assert!(matches!(result, Err(TaxonomyError::InvalidArgument(_))));
}

#[rstest]
#[tokio::test]
async fn test_limit_is_clamped_to_max_page_size(store: MemoryStore) {
	// Arrange
	let tags = tag_service(&store).with_max_page_size(2);
	create_tags(&tags, &["a", "b", "c"]).await;

	// Act
	let page = tags
		.list(&ListQuery::new().limit(500).include_unused(true))
		.await
		.unwrap();

	// Assert
	assert_eq!(page.items.len(), 2);
	assert_eq!(page.total, 3);
}

#[rstest]
#[tokio::test]
async fn test_empty_page_skips_aggregation(store: MemoryStore) {
	let tags = tag_service(&store);

	let page = tags
		.list(&ListQuery::new().include_unused(true))
		.await
		.unwrap();

	assert!(page.items.is_empty());
	assert_eq!(page.total, 0);
	assert_eq!(store.operation_count(StoreOperation::Aggregate), 0);
}
