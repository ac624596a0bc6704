//! Label canonicalization
//!
//! Every tag and category name is stored in canonical form: lowercase ASCII
//! letters and digits separated by single hyphens. The canonical form of a
//! label is also its identity, so `"Web Dev!"`, `"web-dev"` and `"WEB  DEV"`
//! all name the same tag.

use crate::error::{Result, TaxonomyError};

/// Turn a free-text label into its canonical slug
///
/// The input is lowercased, every maximal run of characters outside
/// `[a-z0-9]` becomes a single hyphen, and leading/trailing hyphens are
/// dropped. Non-ASCII letters are separators after lowercasing.
///
/// The function is total and idempotent. Empty or symbol-only input yields
/// an empty string.
///
/// # Example
///
/// ```rust
/// use compass_taxonomy::canonicalize;
///
/// assert_eq!(canonicalize("Web Dev!"), "web-dev");
/// assert_eq!(canonicalize("  C++ / Rust  "), "c-rust");
/// assert_eq!(canonicalize("!!!"), "");
/// assert_eq!(canonicalize(&canonicalize("Web Dev!")), "web-dev");
/// ```
pub fn canonicalize(raw: &str) -> String {
	let mut canonical = String::with_capacity(raw.len());
	let mut pending_separator = false;

	for ch in raw.chars().flat_map(char::to_lowercase) {
		if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
			if pending_separator && !canonical.is_empty() {
				canonical.push('-');
			}
			pending_separator = false;
			canonical.push(ch);
		} else {
			pending_separator = true;
		}
	}

	canonical
}

/// Canonicalize a name that is about to be written
///
/// Returns [`TaxonomyError::InvalidArgument`] when nothing is left after
/// canonicalization.
pub fn canonicalize_non_empty(raw: &str) -> Result<String> {
	let canonical = canonicalize(raw);
	if canonical.is_empty() {
		return Err(TaxonomyError::InvalidArgument(format!(
			"name {:?} has no canonical form",
			raw
		)));
	}
	Ok(canonical)
}

/// Returns `true` if `name` is a non-empty fixed point of [`canonicalize`]
///
/// Equivalent to matching `^[a-z0-9]+(-[a-z0-9]+)*$`.
pub fn is_canonical(name: &str) -> bool {
	!name.is_empty()
		&& !name.starts_with('-')
		&& !name.ends_with('-')
		&& !name.contains("--")
		&& name
			.bytes()
			.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
