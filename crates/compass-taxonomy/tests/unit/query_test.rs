//! Unit tests for listing parameters

use bson::doc;
use compass_taxonomy::{DEFAULT_PAGE_SIZE, ListQuery, SortOrder, TaxonomyError};
use rstest::rstest;

#[rstest]
#[case("name", SortOrder::NameAsc)]
#[case("-name", SortOrder::NameDesc)]
#[case("created_at", SortOrder::CreatedAsc)]
#[case("-created_at", SortOrder::CreatedDesc)]
#[case("updated_at", SortOrder::UpdatedAsc)]
#[case("-updated_at", SortOrder::UpdatedDesc)]
fn test_sort_keys_round_trip(#[case] key: &str, #[case] expected: SortOrder) {
	let order: SortOrder = key.parse().unwrap();

	assert_eq!(order, expected);
	assert_eq!(order.to_string(), key);
}

#[rstest]
#[case("usage_count")]
#[case("Name")]
#[case("")]
#[case("--name")]
fn test_unsupported_sort_keys(#[case] key: &str) {
	let result = key.parse::<SortOrder>();
	assert!(matches!(result, Err(TaxonomyError::InvalidArgument(_))));
}

#[test]
fn test_timestamp_orders_break_ties_by_name() {
	assert_eq!(
		SortOrder::CreatedDesc.to_document(),
		doc! { "created_at": -1, "name": 1 }
	);
	assert_eq!(SortOrder::NameAsc.to_document(), doc! { "name": 1 });
}

#[test]
fn test_list_query_defaults() {
	let query = ListQuery::default();

	assert_eq!(query.skip, 0);
	assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
	assert!(!query.include_unused);
	assert_eq!(query.sort, SortOrder::NameAsc);
}

#[test]
fn test_list_query_sort_key() {
	let query = ListQuery::new().sort_key("-updated_at").unwrap();
	assert_eq!(query.sort, SortOrder::UpdatedDesc);

	assert!(ListQuery::new().sort_key("rating").is_err());
}
