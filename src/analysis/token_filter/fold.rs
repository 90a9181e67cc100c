//! Case and accent folding.
//!
//! Decomposes each word (NFD) and drops the combining marks, so `"Café"`
//! and `"cafe"` index to the same term.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::analysis::token::Token;
use crate::analysis::token_filter::TokenFilter;

/// Strip combining marks from a string after canonical decomposition.
pub fn strip_accents(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Lowercases words and optionally strips their accents.
#[derive(Clone, Copy, Debug)]
pub struct FoldFilter {
    strip_accents: bool,
}

impl FoldFilter {
    /// Lowercase and strip accents.
    pub fn new() -> Self {
        FoldFilter { strip_accents: true }
    }

    /// Lowercase only.
    pub fn case_only() -> Self {
        FoldFilter {
            strip_accents: false,
        }
    }

    fn fold(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        if self.strip_accents {
            strip_accents(&lowered)
        } else {
            lowered
        }
    }
}

impl Default for FoldFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenFilter for FoldFilter {
    fn apply(&self, mut tokens: Vec<Token>) -> Vec<Token> {
        for token in &mut tokens {
            if token.text.is_ascii() && !token.text.bytes().any(|b| b.is_ascii_uppercase()) {
                continue;
            }
            token.text = self.fold(&token.text);
        }
        tokens.retain(|t| !t.text.is_empty());
        tokens
    }

    fn name(&self) -> &'static str {
        "fold"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(texts: &[&str]) -> Vec<Token> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Token::new(*t, i, 0..t.len()))
            .collect()
    }

    #[test]
    fn test_strip_accents() {
        assert_eq!(strip_accents("café"), "cafe");
        assert_eq!(strip_accents("São Paulo"), "Sao Paulo");
        assert_eq!(strip_accents("plain"), "plain");
    }

    #[test]
    fn test_fold() {
        let folded = FoldFilter::new().apply(words(&["Niño", "WATER", "école"]));
        let texts: Vec<&str> = folded.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["nino", "water", "ecole"]);
    }

    #[test]
    fn test_case_only_keeps_accents() {
        let folded = FoldFilter::case_only().apply(words(&["École"]));
        assert_eq!(folded[0].text, "école");
    }
}
