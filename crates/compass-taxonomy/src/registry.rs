//! Shared record lifecycle for tags and categories
//!
//! [`Registry`] holds everything the two services have in common: the
//! record collection, the association field on solutions, canonicalization
//! on every entry point, batched usage counting, the delete guard and the
//! rename cascade. `TagService` and `CategoryService` are thin typed fronts
//! over it.

use bson::{Document, doc};
use compass_db::{DocumentStore, FindOptions};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::canonical::{canonicalize, canonicalize_non_empty};
use crate::error::{Result, TaxonomyError};
use crate::models::record::{now, to_bson_datetime};
use crate::models::{
	Page, SOLUTIONS_COLLECTION, SolutionRef, TaxonomyEntry, TaxonomyPatch, TaxonomyRecord,
};
use crate::query::ListQuery;
use crate::usage::{UsageField, collect_counts};

/// Upper bound applied to `ListQuery::limit` unless configured otherwise
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 1000;

/// One `update_many` of the rename cascade
///
/// A cascade is a saga: its steps run in order against the solutions
/// collection, then the record itself is renamed. A failure after some steps
/// leaves solutions pointing at the new name while the record still carries
/// the old one; the error is returned and nothing is rolled back.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeStep {
	pub filter: Document,
	pub update: Document,
}

impl CascadeStep {
	/// Steps moving every solution reference from `old` to `new`
	///
	/// Tags take two steps (add the new name, then pull the old one) so a
	/// solution already carrying both ends up with a single entry.
	pub fn rename(
		field: UsageField,
		old: &str,
		new: &str,
		stamp: Document,
	) -> Vec<CascadeStep> {
		match field {
			UsageField::Tags => {
				vec![
					CascadeStep {
						filter: field.reference_filter(old),
						update: doc! { "$addToSet": { "tags": new }, "$set": stamp },
					},
					CascadeStep {
						filter: field.reference_filter(old),
						update: doc! { "$pull": { "tags": old } },
					},
				]
			}
			UsageField::Category => {
				let mut set = stamp;
				set.insert("category", new);
				vec![CascadeStep {
					filter: field.reference_filter(old),
					update: doc! { "$set": set },
				}]
			}
		}
	}
}

/// Collection-generic implementation behind the taxonomy services
pub(crate) struct Registry<E> {
	store: Arc<dyn DocumentStore>,
	collection: &'static str,
	field: UsageField,
	max_page_size: u64,
	_entry: PhantomData<fn() -> E>,
}

impl<E> Clone for Registry<E> {
	fn clone(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
			collection: self.collection,
			field: self.field,
			max_page_size: self.max_page_size,
			_entry: PhantomData,
		}
	}
}

impl<E: TaxonomyEntry> Registry<E> {
	pub(crate) fn new(
		store: Arc<dyn DocumentStore>,
		collection: &'static str,
		field: UsageField,
	) -> Self {
		Self {
			store,
			collection,
			field,
			max_page_size: DEFAULT_MAX_PAGE_SIZE,
			_entry: PhantomData,
		}
	}

	pub(crate) fn set_max_page_size(&mut self, max_page_size: u64) {
		self.max_page_size = max_page_size.max(1);
	}

	async fn find_record(&self, name: &str) -> Result<Option<TaxonomyRecord>> {
		self.store
			.find_one(self.collection, doc! { "name": name })
			.await?
			.map(TaxonomyRecord::from_document)
			.transpose()
	}

	async fn find_solution(&self, slug: &str) -> Result<Option<SolutionRef>> {
		self.store
			.find_one(SOLUTIONS_COLLECTION, doc! { "slug": slug })
			.await?
			.map(SolutionRef::from_document)
			.transpose()
	}

	async fn exists(&self, name: &str) -> Result<bool> {
		Ok(self
			.store
			.find_one(self.collection, doc! { "name": name })
			.await?
			.is_some())
	}

	async fn approved_references(&self, name: &str) -> Result<u64> {
		Ok(self
			.store
			.count_documents(SOLUTIONS_COLLECTION, self.field.approved_reference_filter(name))
			.await?)
	}

	fn annotate(records: Vec<TaxonomyRecord>, counts: &HashMap<String, u64>) -> Vec<E> {
		records
			.into_iter()
			.map(|record| {
				let usage = counts.get(&record.name).copied().unwrap_or(0);
				E::from_parts(record, usage)
			})
			.collect()
	}

	pub(crate) async fn create(
		&self,
		raw_name: &str,
		description: Option<String>,
		actor: Option<&str>,
	) -> Result<E> {
		let name = canonicalize_non_empty(raw_name)?;
		if self.exists(&name).await? {
			return Err(TaxonomyError::already_exists(name));
		}

		let record = TaxonomyRecord::new(name, description, actor);
		self.store
			.insert_one(self.collection, record.to_document()?)
			.await?;
		Ok(E::from_parts(record, 0))
	}

	pub(crate) async fn get(&self, raw_name: &str) -> Result<Option<E>> {
		let name = canonicalize(raw_name);
		if name.is_empty() {
			return Ok(None);
		}
		let Some(record) = self.find_record(&name).await? else {
			return Ok(None);
		};
		let usage = self.approved_references(&name).await?;
		Ok(Some(E::from_parts(record, usage)))
	}

	pub(crate) async fn usage_counts(&self, names: Option<&[String]>) -> Result<HashMap<String, u64>> {
		if names.is_some_and(<[String]>::is_empty) {
			return Ok(HashMap::new());
		}
		let results = self
			.store
			.aggregate(SOLUTIONS_COLLECTION, self.field.pipeline(names))
			.await?;
		collect_counts(results)
	}

	pub(crate) async fn usage_count(&self, raw_name: &str) -> Result<u64> {
		let name = canonicalize(raw_name);
		if name.is_empty() {
			return Ok(0);
		}
		self.approved_references(&name).await
	}

	async fn count_used(&self, counts: &HashMap<String, u64>) -> Result<u64> {
		if counts.is_empty() {
			return Ok(0);
		}
		let used: Vec<String> = counts.keys().cloned().collect();
		Ok(self
			.store
			.count_documents(self.collection, doc! { "name": { "$in": used } })
			.await?)
	}

	pub(crate) async fn count(&self, include_unused: bool) -> Result<u64> {
		if include_unused {
			return Ok(self.store.count_documents(self.collection, doc! {}).await?);
		}
		let counts = self.usage_counts(None).await?;
		self.count_used(&counts).await
	}

	pub(crate) async fn list(&self, query: &ListQuery) -> Result<Page<E>> {
		if query.limit == 0 {
			return Err(TaxonomyError::InvalidArgument(
				"limit must be at least 1".to_string(),
			));
		}
		let limit = query.limit.min(self.max_page_size);
		let options = FindOptions::new()
			.sort(query.sort.to_document())
			.skip(query.skip)
			.limit(i64::try_from(limit).unwrap_or(i64::MAX));

		if query.include_unused {
			let records = self.load_records(doc! {}, options).await?;
			let names: Vec<String> = records.iter().map(|r| r.name.clone()).collect();
			let counts = self.usage_counts(Some(names.as_slice())).await?;
			let total = self.store.count_documents(self.collection, doc! {}).await?;
			return Ok(Page {
				items: Self::annotate(records, &counts),
				total,
			});
		}

		// One unrestricted aggregation serves both the page filter and the total
		let counts = self.usage_counts(None).await?;
		let records = self.load_records(doc! {}, options).await?;
		let items = Self::annotate(records, &counts)
			.into_iter()
			.filter(|entry| entry.usage_count() > 0)
			.collect();
		let total = self.count_used(&counts).await?;
		Ok(Page { items, total })
	}

	async fn load_records(&self, filter: Document, options: FindOptions) -> Result<Vec<TaxonomyRecord>> {
		self.store
			.find_many(self.collection, filter, options)
			.await?
			.into_iter()
			.map(TaxonomyRecord::from_document)
			.collect()
	}

	pub(crate) async fn update(
		&self,
		raw_name: &str,
		patch: TaxonomyPatch,
		actor: Option<&str>,
		cascade: bool,
	) -> Result<Option<E>> {
		let current_name = canonicalize(raw_name);
		if current_name.is_empty() {
			return Ok(None);
		}
		let Some(mut record) = self.find_record(&current_name).await? else {
			return Ok(None);
		};

		let new_name = match patch.name.as_deref() {
			Some(raw) => canonicalize_non_empty(raw)?,
			None => current_name.clone(),
		};
		let renamed = new_name != current_name;
		if renamed && self.exists(&new_name).await? {
			return Err(TaxonomyError::already_exists(new_name));
		}

		let updated_at = now();
		let mut stamp = doc! { "updated_at": to_bson_datetime(updated_at) };
		if let Some(actor) = actor {
			stamp.insert("updated_by", actor);
		}

		if renamed && cascade {
			for step in CascadeStep::rename(self.field, &current_name, &new_name, stamp.clone()) {
				self.store
					.update_many(SOLUTIONS_COLLECTION, step.filter, step.update)
					.await?;
			}
		}

		let mut set = stamp;
		set.insert("name", new_name.as_str());
		let mut update = Document::new();
		match &patch.description {
			Some(Some(description)) => {
				set.insert("description", description.as_str());
			}
			Some(None) => {
				update.insert("$unset", doc! { "description": "" });
			}
			None => {}
		}
		update.insert("$set", set);

		let result = self
			.store
			.update_one(self.collection, doc! { "name": current_name.as_str() }, update)
			.await?;
		if !result.matched() {
			return Ok(None);
		}

		record.name = new_name;
		if let Some(description) = patch.description {
			record.description = description;
		}
		record.updated_at = updated_at;
		if let Some(actor) = actor {
			record.updated_by = Some(actor.to_string());
		}

		let usage = self.approved_references(&record.name).await?;
		Ok(Some(E::from_parts(record, usage)))
	}

	pub(crate) async fn delete(&self, raw_name: &str) -> Result<bool> {
		let name = canonicalize(raw_name);
		if name.is_empty() || !self.exists(&name).await? {
			return Ok(false);
		}
		if self.approved_references(&name).await? > 0 {
			return Err(TaxonomyError::in_use(name));
		}
		let deleted = self
			.store
			.delete_one(self.collection, doc! { "name": name.as_str() })
			.await?;
		Ok(deleted > 0)
	}

	/// Checks that both sides of an association exist
	async fn resolve_association(&self, slug: &str, raw_name: &str) -> Result<Option<String>> {
		let name = canonicalize(raw_name);
		if name.is_empty() || self.find_solution(slug).await?.is_none() || !self.exists(&name).await? {
			return Ok(None);
		}
		Ok(Some(name))
	}

	pub(crate) async fn attach(&self, slug: &str, raw_name: &str) -> Result<bool> {
		let Some(name) = self.resolve_association(slug, raw_name).await? else {
			return Ok(false);
		};
		let result = self
			.store
			.update_one(
				SOLUTIONS_COLLECTION,
				doc! { "slug": slug },
				self.field.attach_update(&name),
			)
			.await?;
		Ok(result.matched())
	}

	pub(crate) async fn detach(&self, slug: &str, raw_name: &str) -> Result<bool> {
		let Some(name) = self.resolve_association(slug, raw_name).await? else {
			return Ok(false);
		};
		let filter = match self.field {
			UsageField::Tags => doc! { "slug": slug },
			UsageField::Category => doc! { "slug": slug, "category": name.as_str() },
		};
		let result = self
			.store
			.update_one(SOLUTIONS_COLLECTION, filter, self.field.detach_update(&name))
			.await?;
		Ok(result.matched())
	}

	pub(crate) async fn for_solution(&self, slug: &str) -> Result<Vec<E>> {
		let Some(solution) = self.find_solution(slug).await? else {
			return Ok(Vec::new());
		};
		let names = self.field.referenced_names(&solution);
		if names.is_empty() {
			return Ok(Vec::new());
		}

		let records = self
			.load_records(
				doc! { "name": { "$in": names.as_slice() } },
				FindOptions::new().sort(doc! { "name": 1 }),
			)
			.await?;
		let found: Vec<String> = records.iter().map(|r| r.name.clone()).collect();
		let counts = self.usage_counts(Some(found.as_slice())).await?;
		Ok(Self::annotate(records, &counts))
	}
}
