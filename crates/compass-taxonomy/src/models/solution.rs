//! Read-only view of solution documents
//!
//! Solutions are owned by the catalog outside this crate. The taxonomy only
//! reads their slug, review status and the denormalized `tags`/`category`
//! references, and rewrites those references on rename.

use bson::Document;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::Result;

/// Review state of a solution
///
/// Only [`ReviewStatus::Approved`] solutions count toward usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
	#[default]
	Pending,
	Approved,
	Rejected,
	/// Any status this crate does not know about
	#[serde(other)]
	Unknown,
}

impl ReviewStatus {
	/// Stored representation
	pub const fn as_str(&self) -> &'static str {
		match self {
			ReviewStatus::Pending => "PENDING",
			ReviewStatus::Approved => "APPROVED",
			ReviewStatus::Rejected => "REJECTED",
			ReviewStatus::Unknown => "UNKNOWN",
		}
	}

	pub const fn counts_toward_usage(&self) -> bool {
		matches!(self, ReviewStatus::Approved)
	}
}

impl fmt::Display for ReviewStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The fields of a solution document the taxonomy reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionRef {
	pub slug: String,
	#[serde(default, deserialize_with = "null_as_empty")]
	pub tags: Vec<String>,
	#[serde(default)]
	pub category: Option<String>,
	#[serde(default)]
	pub review_status: ReviewStatus,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl SolutionRef {
	pub(crate) fn from_document(document: Document) -> Result<Self> {
		Ok(bson::deserialize_from_document(document)?)
	}
}
