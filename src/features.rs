//! Query feature extraction and caching.

pub mod cache;
pub mod extractor;
pub mod query;
pub mod synonym;

pub use cache::{CacheStats, QueryCache};
pub use extractor::QueryFeatureExtractor;
pub use query::{QueryFeatures, TermClass, normalize_query};
pub use synonym::DomainSynonyms;
