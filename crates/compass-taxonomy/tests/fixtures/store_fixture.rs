//! Store and service fixtures

use bson::{Document, doc};
use compass_db::{DocumentStore, MemoryStore};
use compass_taxonomy::{CategoryService, TagService};
use rstest::fixture;
use std::sync::Arc;

/// Empty in-memory store
#[fixture]
pub fn store() -> MemoryStore {
	MemoryStore::new()
}

/// Tag service over `store`
pub fn tag_service(store: &MemoryStore) -> TagService {
	TagService::new(Arc::new(store.clone()))
}

/// Category service over `store`
pub fn category_service(store: &MemoryStore) -> CategoryService {
	CategoryService::new(Arc::new(store.clone()))
}

/// Insert solution documents without touching the operation counters
pub async fn seed_solutions(store: &MemoryStore, solutions: impl IntoIterator<Item = Document>) {
	store.seed("solutions", solutions).await;
}

/// Create tags through the service, panicking on failure
pub async fn create_tags(tags: &TagService, names: &[&str]) {
	for name in names {
		tags.create(name, None, Some("fixture")).await.unwrap();
	}
}

/// Create categories through the service, panicking on failure
pub async fn create_categories(categories: &CategoryService, names: &[&str]) {
	for name in names {
		categories.create(name, None, Some("fixture")).await.unwrap();
	}
}

/// Number of solutions whose `field` references `name`
pub async fn references(store: &MemoryStore, field: &str, name: &str) -> u64 {
	store
		.count_documents("solutions", doc! { field: name })
		.await
		.unwrap()
}

/// Tags of one solution as stored
pub async fn stored_tags(store: &MemoryStore, slug: &str) -> Vec<String> {
	let solution = store
		.find_one("solutions", doc! { "slug": slug })
		.await
		.unwrap()
		.unwrap();
	solution
		.get_array("tags")
		.map(|tags| {
			tags.iter()
				.filter_map(|tag| tag.as_str().map(str::to_string))
				.collect()
		})
		.unwrap_or_default()
}
