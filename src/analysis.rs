//! Text analysis for Almoner.
//!
//! Two layers live here. The token pipeline (`tokenizer`, `token_filter`,
//! `analyzer`) turns catalog and query text into the flat term streams the
//! vectorizer consumes. The linguistic layer (`linguistic`, `lemmatizer`)
//! describes the richer structured analysis the feature extractor consumes:
//! part-of-speech tags, lemmas, dependency roles, sentences and entity spans.

pub mod analyzer;
pub mod lemmatizer;
pub mod linguistic;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
