//! Unit tests for TaxonomyError

use compass_db::StoreError;
use compass_taxonomy::{ConflictReason, TaxonomyError};
use rstest::rstest;

#[rstest]
#[case(TaxonomyError::NotFound("rust".into()), "Not found: rust")]
#[case(
	TaxonomyError::Conflict { name: "web-dev".into(), reason: ConflictReason::AlreadyExists },
	"Conflict: 'web-dev' already exists"
)]
#[case(
	TaxonomyError::Conflict { name: "rust".into(), reason: ConflictReason::InUse },
	"Conflict: 'rust' is in use by approved solutions"
)]
#[case(TaxonomyError::InvalidArgument("bad".into()), "Invalid argument: bad")]
#[case(TaxonomyError::InvalidDocument("no name".into()), "Invalid document: no name")]
fn test_error_display(#[case] error: TaxonomyError, #[case] expected: &str) {
	assert_eq!(error.to_string(), expected);
}

#[test]
fn test_store_error_converts_to_store_unavailable() {
	// Arrange
	let store_error = StoreError::ConnectionError("refused".into());

	// Act
	let error: TaxonomyError = store_error.into();

	// Assert
	assert!(matches!(
		error,
		TaxonomyError::StoreUnavailable(StoreError::ConnectionError(_))
	));
	assert_eq!(error.to_string(), "Store unavailable: Connection error: refused");
}

#[test]
fn test_conflict_reason_accessor() {
	let conflict = TaxonomyError::Conflict {
		name: "x".into(),
		reason: ConflictReason::InUse,
	};

	assert_eq!(conflict.conflict_reason(), Some(ConflictReason::InUse));
	assert_eq!(TaxonomyError::NotFound("x".into()).conflict_reason(), None);
}
