//! Solution document builders

use bson::{Document, doc};

/// Solution document with the given slug, tags, category and review status
pub fn solution(slug: &str, tags: &[&str], category: Option<&str>, status: &str) -> Document {
	let mut document = doc! {
		"slug": slug,
		"title": format!("Solution {}", slug),
		"tags": tags.to_vec(),
		"review_status": status,
	};
	if let Some(category) = category {
		document.insert("category", category);
	}
	document
}

/// Approved solution carrying `tags`
pub fn approved(slug: &str, tags: &[&str]) -> Document {
	solution(slug, tags, None, "APPROVED")
}

/// Pending solution carrying `tags`
pub fn pending(slug: &str, tags: &[&str]) -> Document {
	solution(slug, tags, None, "PENDING")
}

/// Approved solution in `category`
pub fn approved_in(slug: &str, category: &str) -> Document {
	solution(slug, &[], Some(category), "APPROVED")
}
