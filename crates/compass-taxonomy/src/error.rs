use compass_db::StoreError;
use std::fmt;
use thiserror::Error;

/// Why a write was refused with [`TaxonomyError::Conflict`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictReason {
	/// Another record already uses the canonical name
	AlreadyExists,
	/// Approved solutions still reference the record
	InUse,
}

impl fmt::Display for ConflictReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConflictReason::AlreadyExists => write!(f, "already exists"),
			ConflictReason::InUse => write!(f, "is in use by approved solutions"),
		}
	}
}

/// Errors that can occur in taxonomy operations
#[derive(Debug, Error)]
pub enum TaxonomyError {
	/// No record with the given canonical name
	///
	/// Service reads return `None`/`false` instead; callers raise this when
	/// they need an error value.
	#[error("Not found: {0}")]
	NotFound(String),

	/// Uniqueness violation on create/rename, or in-use violation on delete
	#[error("Conflict: '{name}' {reason}")]
	Conflict {
		name: String,
		reason: ConflictReason,
	},

	/// Empty canonical name or unsupported query parameter
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// The document store call failed
	#[error("Store unavailable: {0}")]
	StoreUnavailable(#[from] StoreError),

	/// A stored document could not be decoded into its typed record
	#[error("Invalid document: {0}")]
	InvalidDocument(String),
}

impl TaxonomyError {
	pub(crate) fn already_exists(name: impl Into<String>) -> Self {
		TaxonomyError::Conflict {
			name: name.into(),
			reason: ConflictReason::AlreadyExists,
		}
	}

	pub(crate) fn in_use(name: impl Into<String>) -> Self {
		TaxonomyError::Conflict {
			name: name.into(),
			reason: ConflictReason::InUse,
		}
	}

	/// Returns the conflict reason if this is a [`TaxonomyError::Conflict`]
	pub fn conflict_reason(&self) -> Option<ConflictReason> {
		match self {
			TaxonomyError::Conflict { reason, .. } => Some(*reason),
			_ => None,
		}
	}
}

impl From<bson::error::Error> for TaxonomyError {
	fn from(err: bson::error::Error) -> Self {
		TaxonomyError::InvalidDocument(err.to_string())
	}
}

/// Result type for taxonomy operations
pub type Result<T> = std::result::Result<T, TaxonomyError>;
