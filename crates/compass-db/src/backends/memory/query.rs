//! Query-language evaluation for the in-memory backend
//!
//! Supports the subset of the MongoDB query language Compass relies on:
//! equality and membership filters (`$eq`, `$ne`, `$in`, `$nin`, `$exists`,
//! `$and`, `$or`), `$set`/`$unset`/`$addToSet`/`$pull` updates, sorting and
//! projection. Array fields follow MongoDB semantics: a scalar condition
//! matches an array field when any element matches.

use bson::{Bson, Document};
use std::cmp::Ordering;

use crate::error::{Result, StoreError};

/// Resolves a dotted path against a document
pub(crate) fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
	let mut segments = path.split('.');
	let mut current = document.get(segments.next()?)?;
	for segment in segments {
		current = match current {
			Bson::Document(inner) => inner.get(segment)?,
			_ => return None,
		};
	}
	Some(current)
}

fn lookup_mut<'a>(document: &'a mut Document, path: &str) -> Option<&'a mut Bson> {
	match path.split_once('.') {
		None => document.get_mut(path),
		Some((head, rest)) => match document.get_mut(head)? {
			Bson::Document(inner) => lookup_mut(inner, rest),
			_ => None,
		},
	}
}

/// Returns `true` if the document satisfies every condition of the filter
pub(crate) fn matches(document: &Document, filter: &Document) -> Result<bool> {
	for (key, condition) in filter {
		let satisfied = match key.as_str() {
			"$and" => {
				let mut all = true;
				for sub_filter in sub_filters(condition, "$and")? {
					if !matches(document, sub_filter)? {
						all = false;
						break;
					}
				}
				all
			}
			"$or" => {
				let mut any = false;
				for sub_filter in sub_filters(condition, "$or")? {
					if matches(document, sub_filter)? {
						any = true;
						break;
					}
				}
				any
			}
			operator if operator.starts_with('$') => {
				return Err(StoreError::UnsupportedFeature(format!(
					"query operator {}",
					operator
				)));
			}
			path => field_matches(lookup(document, path), condition)?,
		};

		if !satisfied {
			return Ok(false);
		}
	}
	Ok(true)
}

fn sub_filters<'a>(condition: &'a Bson, operator: &str) -> Result<Vec<&'a Document>> {
	let Bson::Array(items) = condition else {
		return Err(StoreError::InvalidOperation(format!(
			"{} expects an array of filters",
			operator
		)));
	};
	items
		.iter()
		.map(|item| match item {
			Bson::Document(filter) => Ok(filter),
			_ => Err(StoreError::InvalidOperation(format!(
				"{} expects an array of filters",
				operator
			))),
		})
		.collect()
}

fn operator_document(condition: &Bson) -> Option<&Document> {
	match condition {
		Bson::Document(inner) if !inner.is_empty() && inner.keys().all(|k| k.starts_with('$')) => {
			Some(inner)
		}
		_ => None,
	}
}

fn field_matches(value: Option<&Bson>, condition: &Bson) -> Result<bool> {
	let Some(operators) = operator_document(condition) else {
		return Ok(equals(value, condition));
	};

	for (operator, operand) in operators {
		let satisfied = match operator.as_str() {
			"$eq" => equals(value, operand),
			"$ne" => !equals(value, operand),
			"$in" => in_list(value, operand, "$in")?,
			"$nin" => !in_list(value, operand, "$nin")?,
			"$exists" => {
				let wanted = operand.as_bool().ok_or_else(|| {
					StoreError::InvalidOperation("$exists expects a boolean".to_string())
				})?;
				value.is_some() == wanted
			}
			other => {
				return Err(StoreError::UnsupportedFeature(format!(
					"query operator {}",
					other
				)));
			}
		};

		if !satisfied {
			return Ok(false);
		}
	}
	Ok(true)
}

fn equals(value: Option<&Bson>, expected: &Bson) -> bool {
	match value {
		None => matches!(expected, Bson::Null),
		Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
			items.iter().any(|item| values_equal(item, expected))
		}
		Some(actual) => values_equal(actual, expected),
	}
}

fn in_list(value: Option<&Bson>, operand: &Bson, operator: &str) -> Result<bool> {
	let Bson::Array(candidates) = operand else {
		return Err(StoreError::InvalidOperation(format!(
			"{} expects an array",
			operator
		)));
	};
	Ok(candidates.iter().any(|candidate| equals(value, candidate)))
}

fn as_number(value: &Bson) -> Option<f64> {
	match value {
		Bson::Int32(n) => Some(f64::from(*n)),
		Bson::Int64(n) => Some(*n as f64),
		Bson::Double(n) => Some(*n),
		_ => None,
	}
}

/// Equality with numeric types normalized (`Int32(1) == Int64(1)`)
pub(crate) fn values_equal(a: &Bson, b: &Bson) -> bool {
	match (as_number(a), as_number(b)) {
		(Some(x), Some(y)) => x == y,
		_ => a == b,
	}
}

fn type_rank(value: Option<&Bson>) -> u8 {
	match value {
		None | Some(Bson::Null) => 0,
		Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => 1,
		Some(Bson::String(_)) => 2,
		Some(Bson::Document(_)) => 3,
		Some(Bson::Array(_)) => 4,
		Some(Bson::ObjectId(_)) => 5,
		Some(Bson::Boolean(_)) => 6,
		Some(Bson::DateTime(_)) => 7,
		Some(_) => 8,
	}
}

/// Total order over BSON values, following MongoDB's cross-type ordering
pub(crate) fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
	let (rank_a, rank_b) = (type_rank(a), type_rank(b));
	if rank_a != rank_b {
		return rank_a.cmp(&rank_b);
	}

	let (Some(a), Some(b)) = (a, b) else {
		return Ordering::Equal;
	};
	if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
		return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
	}
	match (a, b) {
		(Bson::String(x), Bson::String(y)) => x.cmp(y),
		(Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
		(Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
		(Bson::ObjectId(x), Bson::ObjectId(y)) => x.cmp(y),
		_ => Ordering::Equal,
	}
}

/// Stable sort by a `{ field: 1 | -1 }` specification
pub(crate) fn sort_documents(documents: &mut [Document], sort: &Document) -> Result<()> {
	let mut keys = Vec::with_capacity(sort.len());
	for (field, direction) in sort {
		let descending = match as_number(direction) {
			Some(d) if d == 1.0 => false,
			Some(d) if d == -1.0 => true,
			_ => {
				return Err(StoreError::InvalidOperation(format!(
					"sort direction for {} must be 1 or -1",
					field
				)));
			}
		};
		keys.push((field.as_str(), descending));
	}

	documents.sort_by(|a, b| {
		for (field, descending) in &keys {
			let ordering = compare_values(lookup(a, field), lookup(b, field));
			let ordering = if *descending {
				ordering.reverse()
			} else {
				ordering
			};
			if ordering != Ordering::Equal {
				return ordering;
			}
		}
		Ordering::Equal
	});
	Ok(())
}

fn truthy(value: &Bson) -> bool {
	match value {
		Bson::Boolean(b) => *b,
		other => as_number(other).is_some_and(|n| n != 0.0),
	}
}

/// Applies an inclusion or exclusion projection to a top-level document
pub(crate) fn project(document: Document, projection: &Document) -> Result<Document> {
	let include_id = projection.get("_id").is_none_or(truthy);
	let fields: Vec<(&str, bool)> = projection
		.iter()
		.filter(|(key, _)| key.as_str() != "_id")
		.map(|(key, value)| (key.as_str(), truthy(value)))
		.collect();

	if fields.is_empty() {
		let mut document = document;
		if !include_id {
			document.remove("_id");
		}
		return Ok(document);
	}

	if fields.iter().all(|(_, included)| *included) {
		let mut projected = Document::new();
		if include_id && let Some(id) = document.get("_id") {
			projected.insert("_id", id.clone());
		}
		for (field, _) in fields {
			if let Some(value) = document.get(field) {
				projected.insert(field, value.clone());
			}
		}
		Ok(projected)
	} else if fields.iter().all(|(_, included)| !*included) {
		let mut document = document;
		for (field, _) in fields {
			document.remove(field);
		}
		if !include_id {
			document.remove("_id");
		}
		Ok(document)
	} else {
		Err(StoreError::InvalidOperation(
			"projection cannot mix inclusion and exclusion".to_string(),
		))
	}
}

/// Applies an update document in place
///
/// Returns `true` if the document changed.
pub(crate) fn apply_update(document: &mut Document, update: &Document) -> Result<bool> {
	if update.is_empty() || !update.keys().all(|k| k.starts_with('$')) {
		return Err(StoreError::InvalidOperation(
			"update document must only contain update operators".to_string(),
		));
	}

	let mut modified = false;
	for (operator, fields) in update {
		let Bson::Document(fields) = fields else {
			return Err(StoreError::InvalidOperation(format!(
				"{} expects a document",
				operator
			)));
		};
		for (path, value) in fields {
			if path == "_id" {
				return Err(StoreError::InvalidOperation(
					"the _id field is immutable".to_string(),
				));
			}
			modified |= match operator.as_str() {
				"$set" => set_path(document, path, value.clone())?,
				"$unset" => unset_path(document, path),
				"$addToSet" => add_to_set(document, path, value)?,
				"$pull" => pull(document, path, value)?,
				other => {
					return Err(StoreError::UnsupportedFeature(format!(
						"update operator {}",
						other
					)));
				}
			};
		}
	}
	Ok(modified)
}

pub(crate) fn set_path(document: &mut Document, path: &str, value: Bson) -> Result<bool> {
	match path.split_once('.') {
		None => {
			let changed = document
				.get(path)
				.is_none_or(|current| !values_equal(current, &value));
			document.insert(path, value);
			Ok(changed)
		}
		Some((head, rest)) => {
			if !document.contains_key(head) {
				document.insert(head, Document::new());
			}
			match document.get_mut(head) {
				Some(Bson::Document(inner)) => set_path(inner, rest, value),
				_ => Err(StoreError::InvalidOperation(format!(
					"cannot set {} inside a non-document field",
					path
				))),
			}
		}
	}
}

fn unset_path(document: &mut Document, path: &str) -> bool {
	match path.rsplit_once('.') {
		None => document.remove(path).is_some(),
		Some((parent, field)) => match lookup_mut(document, parent) {
			Some(Bson::Document(inner)) => inner.remove(field).is_some(),
			_ => false,
		},
	}
}

fn add_to_set(document: &mut Document, path: &str, value: &Bson) -> Result<bool> {
	match lookup_mut(document, path) {
		None => set_path(document, path, Bson::Array(vec![value.clone()])),
		Some(Bson::Array(items)) => {
			if items.iter().any(|item| values_equal(item, value)) {
				Ok(false)
			} else {
				items.push(value.clone());
				Ok(true)
			}
		}
		Some(_) => Err(StoreError::InvalidOperation(format!(
			"cannot apply $addToSet to non-array field {}",
			path
		))),
	}
}

fn pull(document: &mut Document, path: &str, value: &Bson) -> Result<bool> {
	match lookup_mut(document, path) {
		None => Ok(false),
		Some(Bson::Array(items)) => {
			let before = items.len();
			items.retain(|item| !values_equal(item, value));
			Ok(items.len() != before)
		}
		Some(_) => Err(StoreError::InvalidOperation(format!(
			"cannot apply $pull to non-array field {}",
			path
		))),
	}
}
