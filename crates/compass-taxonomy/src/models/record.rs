//! Persisted taxonomy record and patch

use bson::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Current time truncated to the millisecond precision of BSON datetimes,
/// so a record compares equal to itself after a store round-trip
pub(crate) fn now() -> DateTime<Utc> {
	let now = Utc::now();
	DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Fields stored in the `tags` and `categories` collections
///
/// `name` is always canonical: it is the output of
/// [`canonicalize`](crate::canonicalize) and unique within its collection.
///
/// # Example
///
/// ```rust
/// use compass_taxonomy::TaxonomyRecord;
///
/// let record = TaxonomyRecord::new("web-dev", Some("Web development".into()), Some("alice"));
/// assert_eq!(record.created_by.as_deref(), Some("alice"));
/// assert_eq!(record.updated_by.as_deref(), Some("alice"));
/// assert_eq!(record.created_at, record.updated_at);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyRecord {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_by: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub updated_by: Option<String>,
}

impl TaxonomyRecord {
	/// Create a record stamped with the current time
	///
	/// The actor, when given, is recorded as both creator and last updater.
	/// `name` is stored as given; services canonicalize before calling this.
	pub fn new(name: impl Into<String>, description: Option<String>, actor: Option<&str>) -> Self {
		let now = now();
		Self {
			name: name.into(),
			description,
			created_at: now,
			updated_at: now,
			created_by: actor.map(str::to_string),
			updated_by: actor.map(str::to_string),
		}
	}

	pub(crate) fn from_document(document: Document) -> Result<Self> {
		let stored: StoredRecord = bson::deserialize_from_document(document)?;
		Ok(stored.into())
	}

	pub(crate) fn to_document(&self) -> Result<Document> {
		Ok(bson::serialize_to_document(&StoredRecord::from(self))?)
	}
}

/// On-disk shape, with BSON datetimes instead of RFC 3339 strings
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
	name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	description: Option<String>,
	created_at: bson::DateTime,
	updated_at: bson::DateTime,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	created_by: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	updated_by: Option<String>,
}

fn to_chrono(value: bson::DateTime) -> DateTime<Utc> {
	DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or(DateTime::UNIX_EPOCH)
}

pub(crate) fn to_bson_datetime(value: DateTime<Utc>) -> bson::DateTime {
	bson::DateTime::from_millis(value.timestamp_millis())
}

impl From<StoredRecord> for TaxonomyRecord {
	fn from(stored: StoredRecord) -> Self {
		Self {
			name: stored.name,
			description: stored.description,
			created_at: to_chrono(stored.created_at),
			updated_at: to_chrono(stored.updated_at),
			created_by: stored.created_by,
			updated_by: stored.updated_by,
		}
	}
}

impl From<&TaxonomyRecord> for StoredRecord {
	fn from(record: &TaxonomyRecord) -> Self {
		Self {
			name: record.name.clone(),
			description: record.description.clone(),
			created_at: to_bson_datetime(record.created_at),
			updated_at: to_bson_datetime(record.updated_at),
			created_by: record.created_by.clone(),
			updated_by: record.updated_by.clone(),
		}
	}
}

/// Partial update of a tag or category
///
/// `description` distinguishes "leave as is" (`None`) from "clear"
/// (`Some(None)`).
///
/// # Example
///
/// ```rust
/// use compass_taxonomy::TaxonomyPatch;
///
/// let patch = TaxonomyPatch::new().rename("Web Development").clear_description();
/// assert_eq!(patch.name.as_deref(), Some("Web Development"));
/// assert_eq!(patch.description, Some(None));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyPatch {
	/// New raw name, canonicalized by the service
	pub name: Option<String>,
	pub description: Option<Option<String>>,
}

impl TaxonomyPatch {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn rename(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn describe(mut self, description: impl Into<String>) -> Self {
		self.description = Some(Some(description.into()));
		self
	}

	pub fn clear_description(mut self) -> Self {
		self.description = Some(None);
		self
	}

	/// Returns `true` if applying the patch changes nothing but timestamps
	pub fn is_empty(&self) -> bool {
		self.name.is_none() && self.description.is_none()
	}
}
