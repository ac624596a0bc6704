//! Taxonomy services
//!
//! - `TagService`: tags, many per solution
//! - `CategoryService`: categories, at most one per solution

pub mod category;
pub mod tag;

pub use category::CategoryService;
pub use tag::TagService;
