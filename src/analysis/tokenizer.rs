//! Splitting text into words.

use regex::Regex;

use crate::analysis::token::Token;
use crate::error::{AlmonerError, Result};

/// Turns raw text into an ordered list of words.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &'static str;
}

/// Every match of a pattern is a word; `\w+` by default, so punctuation and
/// apostrophes split ("café's" → "café", "s").
#[derive(Clone, Debug)]
pub struct WordTokenizer {
    pattern: Regex,
}

impl WordTokenizer {
    pub fn new() -> Result<Self> {
        Self::with_pattern(r"\w+")
    }

    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| AlmonerError::analysis(format!("invalid word pattern: {e}")))?;
        Ok(WordTokenizer { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.pattern
            .find_iter(text)
            .enumerate()
            .map(|(position, m)| Token::new(m.as_str(), position, m.range()))
            .collect()
    }

    fn name(&self) -> &'static str {
        "word"
    }
}
