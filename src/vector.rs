//! Vector-space matching of queries against entity descriptions.
//!
//! - `sparse`: sparse term-weight vectors
//! - `tfidf`: the n-gram TF-IDF vectorizer
//! - `index`: the fitted catalog space, one vector per entity
//! - `scorer`: multi-representation semantic scoring

pub mod index;
pub mod scorer;
pub mod sparse;
pub mod tfidf;

pub use self::index::CatalogIndex;
pub use self::scorer::SemanticScorer;
pub use self::sparse::SparseVector;
pub use self::tfidf::TfIdfVectorizer;
