//! Aggregation pipeline evaluation for the in-memory backend
//!
//! Stages: `$match`, `$unwind`, `$group` (with `$sum`), `$sort`, `$skip` and
//! `$limit`. Any other stage is reported as unsupported. A `$group` `_id`
//! may be a document of field references.

use bson::{Bson, Document};
use indexmap::IndexMap;

use super::query;
use crate::error::{Result, StoreError};

pub(crate) fn run(mut documents: Vec<Document>, pipeline: &[Document]) -> Result<Vec<Document>> {
	for stage in pipeline {
		let mut entries = stage.iter();
		let (Some((name, spec)), None) = (entries.next(), entries.next()) else {
			return Err(StoreError::InvalidOperation(
				"pipeline stage must contain exactly one field".to_string(),
			));
		};

		documents = match name.as_str() {
			"$match" => {
				let filter = stage_document(spec, name)?;
				let mut kept = Vec::with_capacity(documents.len());
				for document in documents {
					if query::matches(&document, filter)? {
						kept.push(document);
					}
				}
				kept
			}
			"$unwind" => unwind(documents, unwind_path(spec)?)?,
			"$group" => group(&documents, stage_document(spec, name)?)?,
			"$sort" => {
				query::sort_documents(&mut documents, stage_document(spec, name)?)?;
				documents
			}
			"$skip" => documents.into_iter().skip(stage_count(spec, name)?).collect(),
			"$limit" => documents.into_iter().take(stage_count(spec, name)?).collect(),
			other => {
				return Err(StoreError::UnsupportedFeature(format!(
					"aggregation stage {}",
					other
				)));
			}
		};
	}
	Ok(documents)
}

fn stage_document<'a>(spec: &'a Bson, stage: &str) -> Result<&'a Document> {
	match spec {
		Bson::Document(document) => Ok(document),
		_ => Err(StoreError::InvalidOperation(format!(
			"{} expects a document",
			stage
		))),
	}
}

fn stage_count(spec: &Bson, stage: &str) -> Result<usize> {
	let count = match spec {
		Bson::Int32(n) => i64::from(*n),
		Bson::Int64(n) => *n,
		_ => -1,
	};
	usize::try_from(count).map_err(|_| {
		StoreError::InvalidOperation(format!("{} expects a non-negative integer", stage))
	})
}

fn field_reference(value: &str) -> Option<&str> {
	value.strip_prefix('$')
}

fn unwind_path(spec: &Bson) -> Result<&str> {
	let path = match spec {
		Bson::String(path) => Some(path.as_str()),
		Bson::Document(options) => options.get_str("path").ok(),
		_ => None,
	};
	path.and_then(field_reference).ok_or_else(|| {
		StoreError::InvalidOperation("$unwind expects a \"$field\" path".to_string())
	})
}

fn unwind(documents: Vec<Document>, path: &str) -> Result<Vec<Document>> {
	let mut unwound = Vec::with_capacity(documents.len());
	for document in documents {
		match query::lookup(&document, path).cloned() {
			Some(Bson::Array(items)) => {
				for item in items {
					let mut copy = document.clone();
					query::set_path(&mut copy, path, item)?;
					unwound.push(copy);
				}
			}
			None | Some(Bson::Null) => {}
			Some(_) => unwound.push(document),
		}
	}
	Ok(unwound)
}

fn evaluate(document: &Document, expression: &Bson) -> Bson {
	match expression {
		Bson::String(value) => match field_reference(value) {
			Some(path) => query::lookup(document, path).cloned().unwrap_or(Bson::Null),
			None => expression.clone(),
		},
		Bson::Document(fields) => Bson::Document(
			fields
				.iter()
				.map(|(field, value)| (field.clone(), evaluate(document, value)))
				.collect(),
		),
		other => other.clone(),
	}
}

#[derive(Debug, Clone, Copy, Default)]
struct Sum {
	integer: i64,
	float: f64,
	is_float: bool,
}

impl Sum {
	fn add(&mut self, value: &Bson) {
		match value {
			Bson::Int32(n) => self.integer += i64::from(*n),
			Bson::Int64(n) => self.integer += *n,
			Bson::Double(n) => {
				self.float += *n;
				self.is_float = true;
			}
			// Non-numeric values are ignored by $sum
			_ => {}
		}
	}

	fn into_bson(self) -> Bson {
		if self.is_float {
			Bson::Double(self.float + self.integer as f64)
		} else {
			i32::try_from(self.integer)
				.map(Bson::Int32)
				.unwrap_or(Bson::Int64(self.integer))
		}
	}
}

fn group(documents: &[Document], spec: &Document) -> Result<Vec<Document>> {
	let id_expression = spec.get("_id").ok_or_else(|| {
		StoreError::InvalidOperation("$group requires an _id expression".to_string())
	})?;

	let mut accumulators = Vec::new();
	for (field, accumulator) in spec.iter().filter(|(field, _)| field.as_str() != "_id") {
		let Bson::Document(accumulator) = accumulator else {
			return Err(StoreError::InvalidOperation(format!(
				"accumulator for {} must be a document",
				field
			)));
		};
		match accumulator.get("$sum") {
			Some(operand) if accumulator.len() == 1 => accumulators.push((field.as_str(), operand)),
			_ => {
				return Err(StoreError::UnsupportedFeature(format!(
					"accumulator for {} (only $sum is supported)",
					field
				)));
			}
		}
	}

	// Keyed by the rendered _id so groups keep first-seen order
	let mut groups: IndexMap<String, (Bson, Vec<Sum>)> = IndexMap::new();
	for document in documents {
		let key = evaluate(document, id_expression);
		let (_, sums) = groups
			.entry(key.to_string())
			.or_insert_with(|| (key.clone(), vec![Sum::default(); accumulators.len()]));
		for (sum, (_, operand)) in sums.iter_mut().zip(&accumulators) {
			sum.add(&evaluate(document, operand));
		}
	}

	Ok(groups
		.into_values()
		.map(|(key, sums)| {
			let mut output = Document::new();
			output.insert("_id", key);
			for ((field, _), sum) in accumulators.iter().zip(sums) {
				output.insert(*field, sum.into_bson());
			}
			output
		})
		.collect())
}
