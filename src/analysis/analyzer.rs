//! The term pipeline.
//!
//! ```text
//! raw text → tokenizer → filter 1 → ... → filter N → terms
//! ```
//!
//! # Examples
//!
//! ```
//! use almoner::analysis::analyzer::{Analyzer, PipelineAnalyzer};
//!
//! let analyzer = PipelineAnalyzer::english().unwrap();
//! let terms = analyzer.terms("Protecting the Café's Wildlife").unwrap();
//! assert_eq!(terms, vec!["protecting", "cafe", "s", "wildlife"]);
//! ```

use std::sync::Arc;

use crate::analysis::token::Token;
use crate::analysis::token_filter::{FoldFilter, StopFilter, TokenFilter};
use crate::analysis::tokenizer::{Tokenizer, WordTokenizer};
use crate::error::Result;

/// Converts text into the terms the vectorizer counts.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<Vec<Token>>;

    fn name(&self) -> &'static str;

    /// The surviving words, in order.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.into_iter().map(|t| t.text).collect())
    }
}

/// A tokenizer followed by a chain of filters.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn TokenFilter>>,
    name: &'static str,
}

impl PipelineAnalyzer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            tokenizer,
            filters: Vec::new(),
            name: "pipeline",
        }
    }

    /// `\w+` words, lowercased and accent-stripped, English stop words removed.
    pub fn english() -> Result<Self> {
        Ok(PipelineAnalyzer::new(Arc::new(WordTokenizer::new()?))
            .add_filter(Arc::new(FoldFilter::new()))
            .add_filter(Arc::new(StopFilter::english()))
            .with_name("english"))
    }

    pub fn add_filter(mut self, filter: Arc<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<Token>> {
        Ok(self
            .filters
            .iter()
            .fold(self.tokenizer.tokenize(text), |tokens, filter| filter.apply(tokens)))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field("filters", &self.filter_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_chain() {
        let analyzer = PipelineAnalyzer::new(Arc::new(WordTokenizer::new().unwrap()))
            .add_filter(Arc::new(FoldFilter::case_only()))
            .add_filter(Arc::new(StopFilter::from_words(["the", "and"])));

        let terms = analyzer.terms("Feed THE hungry AND house").unwrap();
        assert_eq!(terms, vec!["feed", "hungry", "house"]);
        assert_eq!(analyzer.name(), "pipeline");
        assert_eq!(analyzer.filter_names(), vec!["fold", "stop"]);
    }

    #[test]
    fn test_english_chain() {
        let analyzer = PipelineAnalyzer::english().unwrap();
        let terms = analyzer.terms("Literacy programs for the children of São Paulo").unwrap();

        assert_eq!(terms, vec!["literacy", "programs", "children", "sao", "paulo"]);
        assert_eq!(analyzer.name(), "english");
    }

    #[test]
    fn test_empty_input() {
        let analyzer = PipelineAnalyzer::english().unwrap();
        assert!(analyzer.terms("").unwrap().is_empty());
        assert!(analyzer.terms("the of and").unwrap().is_empty());
    }
}
