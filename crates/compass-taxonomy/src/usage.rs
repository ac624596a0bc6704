//! Usage aggregation over approved solutions
//!
//! Tags and categories are counted with the same pipeline shape; the only
//! difference is whether the association field is an array (unwound before
//! grouping) or a scalar (grouped directly).

use bson::{Bson, Document, doc};
use std::collections::HashMap;

use crate::error::{Result, TaxonomyError};
use crate::models::{ReviewStatus, SolutionRef};

/// The association field on solution documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageField {
	/// `tags: [string]`
	Tags,
	/// `category: string`
	Category,
}

impl UsageField {
	/// Field name on solution documents
	pub const fn field(&self) -> &'static str {
		match self {
			UsageField::Tags => "tags",
			UsageField::Category => "category",
		}
	}

	pub const fn is_array(&self) -> bool {
		matches!(self, UsageField::Tags)
	}

	/// Aggregation pipeline counting approved references per name
	///
	/// With `names`, only those names are counted. The output documents are
	/// `{ _id: name, count: n }`, where `n` is a number of solutions: tags
	/// are grouped per solution first so duplicates in one array count once.
	///
	/// # Example
	///
	/// ```rust
	/// use compass_taxonomy::UsageField;
	///
	/// let pipeline = UsageField::Tags.pipeline(None);
	/// assert_eq!(pipeline.len(), 4);
	/// assert!(pipeline[1].contains_key("$unwind"));
	///
	/// let pipeline = UsageField::Category.pipeline(Some(&["data".to_string()][..]));
	/// assert_eq!(pipeline.len(), 2);
	/// ```
	pub fn pipeline(&self, names: Option<&[String]>) -> Vec<Document> {
		let field = self.field();
		let mut first_match = doc! { "review_status": ReviewStatus::Approved.as_str() };
		if let Some(names) = names {
			first_match.insert(field, doc! { "$in": names });
		}

		let mut pipeline = vec![doc! { "$match": first_match }];
		if !self.is_array() {
			pipeline.push(doc! {
				"$group": { "_id": format!("${}", field), "count": { "$sum": 1 } }
			});
			return pipeline;
		}

		pipeline.push(doc! { "$unwind": format!("${}", field) });
		// Narrow again: unwinding re-emits the other names of each solution
		if let Some(names) = names {
			pipeline.push(doc! { "$match": { field: { "$in": names } } });
		}
		// A name repeated inside one solution's array still counts once
		pipeline.push(doc! {
			"$group": { "_id": { "solution": "$_id", "name": format!("${}", field) } }
		});
		pipeline.push(doc! {
			"$group": { "_id": "$_id.name", "count": { "$sum": 1 } }
		});
		pipeline
	}

	/// Filter for approved solutions referencing `name`
	pub fn approved_reference_filter(&self, name: &str) -> Document {
		doc! { self.field(): name, "review_status": ReviewStatus::Approved.as_str() }
	}

	/// Filter for every solution referencing `name`, whatever its status
	pub fn reference_filter(&self, name: &str) -> Document {
		doc! { self.field(): name }
	}

	/// Update attaching `name` to a solution
	pub fn attach_update(&self, name: &str) -> Document {
		match self {
			UsageField::Tags => doc! { "$addToSet": { "tags": name } },
			UsageField::Category => doc! { "$set": { "category": name } },
		}
	}

	/// Update detaching `name` from a solution
	///
	/// For categories the caller's filter must also match the current
	/// category, otherwise another category would be unset.
	pub fn detach_update(&self, name: &str) -> Document {
		match self {
			UsageField::Tags => doc! { "$pull": { "tags": name } },
			UsageField::Category => doc! { "$unset": { "category": "" } },
		}
	}

	/// Names a solution references through this field
	pub fn referenced_names(&self, solution: &SolutionRef) -> Vec<String> {
		match self {
			UsageField::Tags => solution.tags.clone(),
			UsageField::Category => solution.category.iter().cloned().collect(),
		}
	}
}

/// Convert `{ _id, count }` group output into a name → count map
///
/// Groups whose `_id` is not a string (solutions without the field) are
/// skipped.
pub(crate) fn collect_counts(results: Vec<Document>) -> Result<HashMap<String, u64>> {
	let mut counts = HashMap::with_capacity(results.len());
	for result in results {
		let Some(Bson::String(name)) = result.get("_id") else {
			continue;
		};
		let count = match result.get("count") {
			Some(Bson::Int32(n)) => u64::try_from(*n).ok(),
			Some(Bson::Int64(n)) => u64::try_from(*n).ok(),
			Some(Bson::Double(n)) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as u64),
			_ => None,
		}
		.ok_or_else(|| {
			TaxonomyError::InvalidDocument(format!("usage group for '{}' has no valid count", name))
		})?;
		if count > 0 {
			counts.insert(name.clone(), count);
		}
	}
	Ok(counts)
}
