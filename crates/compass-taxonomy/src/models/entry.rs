//! Usage-annotated tag and category views

use serde::{Deserialize, Serialize};
use std::ops::Deref;

use super::record::TaxonomyRecord;

/// A taxonomy record annotated with its usage count
///
/// Implemented by [`Tag`] and [`Category`] so the shared registry logic can
/// build either one.
pub trait TaxonomyEntry: Send + Sync + Sized {
	fn from_parts(record: TaxonomyRecord, usage_count: u64) -> Self;

	fn record(&self) -> &TaxonomyRecord;

	fn usage_count(&self) -> u64;
}

/// Tag with its usage count
///
/// `usage_count` is the number of approved solutions whose `tags` array
/// contains this tag's name. It is computed on read, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
	#[serde(flatten)]
	pub record: TaxonomyRecord,
	pub usage_count: u64,
}

impl TaxonomyEntry for Tag {
	fn from_parts(record: TaxonomyRecord, usage_count: u64) -> Self {
		Self {
			record,
			usage_count,
		}
	}

	fn record(&self) -> &TaxonomyRecord {
		&self.record
	}

	fn usage_count(&self) -> u64 {
		self.usage_count
	}
}

impl Deref for Tag {
	type Target = TaxonomyRecord;

	fn deref(&self) -> &Self::Target {
		&self.record
	}
}

/// Category with its usage count
///
/// `usage_count` is the number of approved solutions whose `category`
/// equals this category's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
	#[serde(flatten)]
	pub record: TaxonomyRecord,
	pub usage_count: u64,
}

impl TaxonomyEntry for Category {
	fn from_parts(record: TaxonomyRecord, usage_count: u64) -> Self {
		Self {
			record,
			usage_count,
		}
	}

	fn record(&self) -> &TaxonomyRecord {
		&self.record
	}

	fn usage_count(&self) -> u64 {
		self.usage_count
	}
}

impl Deref for Category {
	type Target = TaxonomyRecord;

	fn deref(&self) -> &Self::Target {
		&self.record
	}
}

/// One page of a listing plus the total across all pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<E> {
	pub items: Vec<E>,
	pub total: u64,
}

impl<E> Page<E> {
	pub fn names(&self) -> Vec<&str>
	where
		E: TaxonomyEntry,
	{
		self.items
			.iter()
			.map(|item| item.record().name.as_str())
			.collect()
	}
}
