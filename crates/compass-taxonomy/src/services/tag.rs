//! Tag service

use compass_db::DocumentStore;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Page, TAGS_COLLECTION, Tag, TaxonomyPatch};
use crate::query::ListQuery;
use crate::registry::Registry;
use crate::usage::UsageField;

/// Tag lifecycle, usage counting and solution association
///
/// Every entry point canonicalizes the raw name it receives, so callers can
/// pass user input directly. Usage counts only include solutions whose
/// review status is `APPROVED`.
///
/// A name with no canonical form (empty after canonicalization) is only an
/// error where it would be stored: `create` and the target of a rename. On
/// lookup paths it names nothing, so it reads as an absent tag.
///
/// # Example
///
/// ```rust
/// use compass_db::MemoryStore;
/// use compass_taxonomy::TagService;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let tags = TagService::new(Arc::new(MemoryStore::new()));
///
/// let tag = tags.create("Web Dev!", None, Some("alice")).await.unwrap();
/// assert_eq!(tag.name, "web-dev");
///
/// let found = tags.get_by_name("WEB DEV").await.unwrap().unwrap();
/// assert_eq!(found, tag);
/// # });
/// ```
#[derive(Clone)]
pub struct TagService {
	registry: Registry<Tag>,
}

impl TagService {
	/// Create a service over the given store
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self {
			registry: Registry::new(store, TAGS_COLLECTION, UsageField::Tags),
		}
	}

	/// Cap `ListQuery::limit` at `max_page_size`
	pub fn with_max_page_size(mut self, max_page_size: u64) -> Self {
		self.registry.set_max_page_size(max_page_size);
		self
	}

	/// Create a tag
	///
	/// # Errors
	///
	/// - `InvalidArgument` if the name has no canonical form
	/// - `Conflict` (`AlreadyExists`) if a tag with the canonical name exists
	#[tracing::instrument(level = "debug", skip(self, description))]
	pub async fn create(
		&self,
		raw_name: &str,
		description: Option<String>,
		actor: Option<&str>,
	) -> Result<Tag> {
		self.registry.create(raw_name, description, actor).await
	}

	/// Look a tag up by any spelling of its name, with its usage count
	///
	/// A name with no canonical form yields `None`.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn get_by_name(&self, raw_name: &str) -> Result<Option<Tag>> {
		self.registry.get(raw_name).await
	}

	/// List one page of tags
	///
	/// Usage counts for the page come from a single aggregation. Without
	/// `include_unused`, unused tags are dropped from the page after counting
	/// and `total` counts the used tags of the whole collection.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn list(&self, query: &ListQuery) -> Result<Page<Tag>> {
		self.registry.list(query).await
	}

	/// Approved-solution counts per tag name, in one aggregation
	///
	/// With `names`, only those tags are counted; otherwise every tag that
	/// any approved solution references. Unused names are absent.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn usage_counts(&self, names: Option<&[String]>) -> Result<HashMap<String, u64>> {
		self.registry.usage_counts(names).await
	}

	/// Number of approved solutions referencing the tag
	///
	/// A name with no canonical form counts 0.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn usage_count(&self, raw_name: &str) -> Result<u64> {
		self.registry.usage_count(raw_name).await
	}

	/// Number of tags, or of used tags when `include_unused` is false
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn count(&self, include_unused: bool) -> Result<u64> {
		self.registry.count(include_unused).await
	}

	/// Apply a patch to a tag
	///
	/// Returns `None` if the tag does not exist, which includes a current
	/// name with no canonical form. When the patch renames the
	/// tag and `cascade` is set, every solution referencing the old name is
	/// moved to the new one before the tag record itself is renamed.
	///
	/// # Errors
	///
	/// - `InvalidArgument` if the new name has no canonical form
	/// - `Conflict` (`AlreadyExists`) if another tag already has the new name
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn update(
		&self,
		raw_name: &str,
		patch: TaxonomyPatch,
		actor: Option<&str>,
		cascade: bool,
	) -> Result<Option<Tag>> {
		self.registry.update(raw_name, patch, actor, cascade).await
	}

	/// Delete a tag no approved solution uses
	///
	/// Returns `false` if the tag does not exist or the name has no
	/// canonical form.
	///
	/// # Errors
	///
	/// `Conflict` (`InUse`) while an approved solution references the tag.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn delete(&self, raw_name: &str) -> Result<bool> {
		self.registry.delete(raw_name).await
	}

	/// Add an existing tag to a solution's tag set
	///
	/// Returns `false` if either the solution or the tag does not exist. A
	/// name with no canonical form is a tag that does not exist.
	/// Adding a tag the solution already has succeeds without change.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn add_tag_to_solution(&self, slug: &str, raw_name: &str) -> Result<bool> {
		self.registry.attach(slug, raw_name).await
	}

	/// Remove a tag from a solution's tag set
	///
	/// Returns `false` if either the solution or the tag does not exist,
	/// including when the name has no canonical form.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn remove_tag_from_solution(&self, slug: &str, raw_name: &str) -> Result<bool> {
		self.registry.detach(slug, raw_name).await
	}

	/// Tags referenced by a solution, sorted by name, with usage counts
	///
	/// Names without a tag record are skipped. An unknown solution yields an
	/// empty list.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn solution_tags(&self, slug: &str) -> Result<Vec<Tag>> {
		self.registry.for_solution(slug).await
	}
}
