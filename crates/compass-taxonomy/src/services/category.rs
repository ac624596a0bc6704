//! Category service

use compass_db::DocumentStore;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{CATEGORIES_COLLECTION, Category, Page, TaxonomyPatch};
use crate::query::ListQuery;
use crate::registry::Registry;
use crate::usage::UsageField;

/// Category lifecycle, usage counting and solution assignment
///
/// A solution has at most one category, stored by canonical name in its
/// `category` field. Otherwise the rules match [`TagService`](crate::TagService),
/// including how a name with no canonical form is read: an error for
/// `create` and rename targets, an absent category everywhere else.
#[derive(Clone)]
pub struct CategoryService {
	registry: Registry<Category>,
}

impl CategoryService {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self {
			registry: Registry::new(store, CATEGORIES_COLLECTION, UsageField::Category),
		}
	}

	/// Cap `ListQuery::limit` at `max_page_size`
	pub fn with_max_page_size(mut self, max_page_size: u64) -> Self {
		self.registry.set_max_page_size(max_page_size);
		self
	}

	#[tracing::instrument(level = "debug", skip(self, description))]
	pub async fn create(
		&self,
		raw_name: &str,
		description: Option<String>,
		actor: Option<&str>,
	) -> Result<Category> {
		self.registry.create(raw_name, description, actor).await
	}

	/// `None` for an unknown name or one with no canonical form
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn get_by_name(&self, raw_name: &str) -> Result<Option<Category>> {
		self.registry.get(raw_name).await
	}

	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn list(&self, query: &ListQuery) -> Result<Page<Category>> {
		self.registry.list(query).await
	}

	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn usage_counts(&self, names: Option<&[String]>) -> Result<HashMap<String, u64>> {
		self.registry.usage_counts(names).await
	}

	/// 0 for an unknown name or one with no canonical form
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn usage_count(&self, raw_name: &str) -> Result<u64> {
		self.registry.usage_count(raw_name).await
	}

	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn count(&self, include_unused: bool) -> Result<u64> {
		self.registry.count(include_unused).await
	}

	/// Apply a patch to a category
	///
	/// With `cascade`, a rename first points every solution in the old
	/// category at the new name.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn update(
		&self,
		raw_name: &str,
		patch: TaxonomyPatch,
		actor: Option<&str>,
		cascade: bool,
	) -> Result<Option<Category>> {
		self.registry.update(raw_name, patch, actor, cascade).await
	}

	/// Delete a category no approved solution uses
	///
	/// Returns `false` if the category does not exist or the name has no
	/// canonical form.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn delete(&self, raw_name: &str) -> Result<bool> {
		self.registry.delete(raw_name).await
	}

	/// Set a solution's category, replacing any previous one
	///
	/// Returns `false` if the solution or the category does not exist. A
	/// name with no canonical form is a category that does not exist.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn assign_to_solution(&self, slug: &str, raw_name: &str) -> Result<bool> {
		self.registry.attach(slug, raw_name).await
	}

	/// Unset a solution's category if it currently is `raw_name`
	///
	/// Returns `false` under the same conditions as `assign_to_solution`.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn clear_from_solution(&self, slug: &str, raw_name: &str) -> Result<bool> {
		self.registry.detach(slug, raw_name).await
	}

	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn solution_category(&self, slug: &str) -> Result<Option<Category>> {
		Ok(self.registry.for_solution(slug).await?.into_iter().next())
	}
}
