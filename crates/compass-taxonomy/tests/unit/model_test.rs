//! Unit tests for taxonomy models

use compass_taxonomy::{Category, ReviewStatus, Tag, TaxonomyEntry, TaxonomyPatch, TaxonomyRecord};
use rstest::rstest;

/// Test TaxonomyRecord::new() stamps both audit fields with the actor
#[test]
fn test_record_new_with_actor() {
	// Arrange & Act
	let record = TaxonomyRecord::new("rust", Some("systems language".into()), Some("alice"));

	// Assert
	assert_eq!(record.name, "rust");
	assert_eq!(record.description.as_deref(), Some("systems language"));
	assert_eq!(record.created_by.as_deref(), Some("alice"));
	assert_eq!(record.updated_by.as_deref(), Some("alice"));
	assert_eq!(record.created_at, record.updated_at);
	assert!(record.created_at.timestamp() > 0);
}

/// Test TaxonomyRecord::new() without an actor leaves audit fields empty
#[test]
fn test_record_new_without_actor() {
	let record = TaxonomyRecord::new("rust", None, None);

	assert!(record.created_by.is_none());
	assert!(record.updated_by.is_none());
}

/// Test timestamps carry millisecond precision only
#[test]
fn test_record_timestamps_are_millisecond_precise() {
	let record = TaxonomyRecord::new("rust", None, None);

	assert_eq!(record.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
}

/// Test Tag and Category expose the record through Deref
#[test]
fn test_entries_deref_to_record() {
	// Arrange
	let record = TaxonomyRecord::new("data", None, None);

	// Act
	let tag = Tag::from_parts(record.clone(), 3);
	let category = Category::from_parts(record, 0);

	// Assert
	assert_eq!(tag.name, "data");
	assert_eq!(TaxonomyEntry::usage_count(&tag), 3);
	assert_eq!(category.record().name, "data");
	assert_eq!(category.usage_count, 0);
}

/// Test Tag JSON shape flattens the record next to usage_count
#[test]
fn test_tag_json_is_flat() {
	// Arrange
	let tag = Tag::from_parts(TaxonomyRecord::new("rust", None, Some("bob")), 2);

	// Act
	let json = serde_json::to_value(&tag).unwrap();

	// Assert
	assert_eq!(json["name"], "rust");
	assert_eq!(json["usage_count"], 2);
	assert_eq!(json["created_by"], "bob");
	assert!(json.get("description").is_none());
}

/// Test TaxonomyPatch builders
#[rstest]
#[case(TaxonomyPatch::new(), None, None)]
#[case(TaxonomyPatch::new().rename("Go"), Some("Go"), None)]
#[case(TaxonomyPatch::new().describe("d"), None, Some(Some("d")))]
#[case(TaxonomyPatch::new().clear_description(), None, Some(None))]
fn test_patch_builders(
	#[case] patch: TaxonomyPatch,
	#[case] name: Option<&str>,
	#[case] description: Option<Option<&str>>,
) {
	assert_eq!(patch.name.as_deref(), name);
	assert_eq!(
		patch.description.as_ref().map(|d| d.as_deref()),
		description
	);
	assert_eq!(patch.is_empty(), name.is_none() && description.is_none());
}

/// Test only approved solutions count toward usage
#[rstest]
#[case(ReviewStatus::Approved, true)]
#[case(ReviewStatus::Pending, false)]
#[case(ReviewStatus::Rejected, false)]
#[case(ReviewStatus::Unknown, false)]
fn test_review_status_counts(#[case] status: ReviewStatus, #[case] expected: bool) {
	assert_eq!(status.counts_toward_usage(), expected);
}

#[test]
fn test_review_status_default_is_pending() {
	assert_eq!(ReviewStatus::default(), ReviewStatus::Pending);
	assert_eq!(ReviewStatus::Approved.to_string(), "APPROVED");
}
