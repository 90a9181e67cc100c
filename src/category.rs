//! Focus-category index and matcher.

pub mod index;
pub mod matcher;

pub use self::index::CategoryIndex;
pub use self::matcher::{CategoryMatcher, IMPORTANT_CATEGORIES};
