//! Model definitions for the taxonomy
//!
//! - `TaxonomyRecord`: persisted fields shared by tags and categories
//! - `Tag` / `Category`: a record plus its computed usage count
//! - `TaxonomyPatch`: partial update applied by `update`
//! - `SolutionRef`: the slice of a solution document the taxonomy reads

pub mod entry;
pub mod record;
pub mod solution;

pub use entry::{Category, Page, Tag, TaxonomyEntry};
pub use record::{TaxonomyPatch, TaxonomyRecord};
pub use solution::{ReviewStatus, SolutionRef};

/// Collection holding tag records
pub const TAGS_COLLECTION: &str = "tags";

/// Collection holding category records
pub const CATEGORIES_COLLECTION: &str = "categories";

/// Collection holding the solutions that reference tags and categories
pub const SOLUTIONS_COLLECTION: &str = "solutions";
