//! Words produced by the term pipeline.

use std::ops::Range;

/// A word found in catalog or query text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Ordinal among the words of the input, before any filtering.
    pub position: usize,
    /// Byte span of the word in the input.
    pub span: Range<usize>,
}

impl Token {
    pub fn new<S: Into<String>>(text: S, position: usize, span: Range<usize>) -> Self {
        Token {
            text: text.into(),
            position,
            span,
        }
    }

    /// The unfiltered source text of this word.
    pub fn source<'a>(&self, input: &'a str) -> Option<&'a str> {
        input.get(self.span.clone())
    }

    pub fn is_numeric(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(|c| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_slice() {
        let input = "Clean Water 2030";
        let token = Token::new("water", 1, 6..11);
        assert_eq!(token.source(input), Some("Water"));
        assert!(!token.is_numeric());
        assert!(Token::new("2030", 2, 12..16).is_numeric());
    }
}
