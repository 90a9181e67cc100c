//! Token filters.
//!
//! The vectorizer chain for catalog and query text:
//!
//! ```text
//! WordTokenizer → FoldFilter → StopFilter → TfIdfVectorizer
//! ```

use crate::analysis::token::Token;

pub mod fold;
pub mod stop;

pub use fold::{FoldFilter, strip_accents};
pub use stop::{StopFilter, is_english_stop_word};

/// A rewrite of a word list; filters may drop, edit or keep words.
pub trait TokenFilter: Send + Sync {
    fn apply(&self, tokens: Vec<Token>) -> Vec<Token>;

    fn name(&self) -> &'static str;
}
