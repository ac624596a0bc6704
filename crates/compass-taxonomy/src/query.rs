//! Listing parameters

use bson::{Document, doc};
use std::fmt;
use std::str::FromStr;

use crate::error::TaxonomyError;

/// Page size used when a query does not set one
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Sort order of a listing
///
/// Parsed from the keys `name`, `-name`, `created_at`, `-created_at`,
/// `updated_at` and `-updated_at`. Timestamp orders break ties by name so
/// pages are stable.
///
/// # Example
///
/// ```rust
/// use compass_taxonomy::SortOrder;
///
/// let order: SortOrder = "-created_at".parse().unwrap();
/// assert_eq!(order, SortOrder::CreatedDesc);
/// assert!("popularity".parse::<SortOrder>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
	#[default]
	NameAsc,
	NameDesc,
	CreatedAsc,
	CreatedDesc,
	UpdatedAsc,
	UpdatedDesc,
}

impl SortOrder {
	pub const fn as_str(&self) -> &'static str {
		match self {
			SortOrder::NameAsc => "name",
			SortOrder::NameDesc => "-name",
			SortOrder::CreatedAsc => "created_at",
			SortOrder::CreatedDesc => "-created_at",
			SortOrder::UpdatedAsc => "updated_at",
			SortOrder::UpdatedDesc => "-updated_at",
		}
	}

	/// Store sort specification
	pub fn to_document(self) -> Document {
		match self {
			SortOrder::NameAsc => doc! { "name": 1 },
			SortOrder::NameDesc => doc! { "name": -1 },
			SortOrder::CreatedAsc => doc! { "created_at": 1, "name": 1 },
			SortOrder::CreatedDesc => doc! { "created_at": -1, "name": 1 },
			SortOrder::UpdatedAsc => doc! { "updated_at": 1, "name": 1 },
			SortOrder::UpdatedDesc => doc! { "updated_at": -1, "name": 1 },
		}
	}
}

impl FromStr for SortOrder {
	type Err = TaxonomyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"name" => Ok(SortOrder::NameAsc),
			"-name" => Ok(SortOrder::NameDesc),
			"created_at" => Ok(SortOrder::CreatedAsc),
			"-created_at" => Ok(SortOrder::CreatedDesc),
			"updated_at" => Ok(SortOrder::UpdatedAsc),
			"-updated_at" => Ok(SortOrder::UpdatedDesc),
			other => Err(TaxonomyError::InvalidArgument(format!(
				"unsupported sort key '{}'",
				other
			))),
		}
	}
}

impl fmt::Display for SortOrder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Parameters of a `list` call
///
/// Defaults: first page of [`DEFAULT_PAGE_SIZE`] entries, name ascending,
/// unused entries excluded.
///
/// # Example
///
/// ```rust
/// use compass_taxonomy::{ListQuery, SortOrder};
///
/// let query = ListQuery::new().skip(20).limit(10).include_unused(true);
/// assert_eq!(query.sort, SortOrder::NameAsc);
/// assert_eq!((query.skip, query.limit), (20, 10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
	pub skip: u64,
	pub limit: u64,
	/// Keep entries no approved solution references
	pub include_unused: bool,
	pub sort: SortOrder,
}

impl Default for ListQuery {
	fn default() -> Self {
		Self {
			skip: 0,
			limit: DEFAULT_PAGE_SIZE,
			include_unused: false,
			sort: SortOrder::default(),
		}
	}
}

impl ListQuery {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn skip(mut self, skip: u64) -> Self {
		self.skip = skip;
		self
	}

	pub fn limit(mut self, limit: u64) -> Self {
		self.limit = limit;
		self
	}

	pub fn include_unused(mut self, include_unused: bool) -> Self {
		self.include_unused = include_unused;
		self
	}

	pub fn sort(mut self, sort: SortOrder) -> Self {
		self.sort = sort;
		self
	}

	/// Set the order from a sort key such as `-created_at`
	pub fn sort_key(self, key: &str) -> Result<Self, TaxonomyError> {
		Ok(self.sort(key.parse()?))
	}
}
