//! TF-IDF vectorizer for catalog and query text.
//!
//! Documents are analyzed into stop-filtered terms, expanded into word
//! n-grams and weighted with sub-linear term frequency and smoothed inverse
//! document frequency:
//!
//! ```text
//! tf  = 1 + ln(count)
//! idf = ln((1 + n) / (1 + df)) + 1
//! ```
//!
//! Vectors are L2-normalized, so a dot product is a cosine similarity.
//! The vocabulary lives in a sorted map and truncation ties break
//! lexicographically, which makes the fitted space a pure function of the
//! corpus.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::config::VectorizerConfig;
use crate::error::Result;
use crate::vector::sparse::SparseVector;

/// TF-IDF vectorizer over word n-grams.
pub struct TfIdfVectorizer {
    /// Term -> dimension, dimensions assigned in term order.
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per dimension.
    idf: Vec<f64>,
    /// Total number of documents seen during fitting.
    n_documents: usize,
    config: VectorizerConfig,
    analyzer: Arc<dyn Analyzer>,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("ngram_range", &(self.config.ngram_min, self.config.ngram_max))
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(analyzer: Arc<dyn Analyzer>, config: VectorizerConfig) -> Self {
        TfIdfVectorizer {
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            config,
            analyzer,
        }
    }

    /// Fit the vocabulary and IDF weights on a corpus.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        let n = documents.len();
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut corpus_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let grams = self.ngrams(doc)?;
            let unique: HashSet<&String> = grams.iter().collect();
            for gram in unique {
                *document_frequency.entry(gram.clone()).or_insert(0) += 1;
            }
            for gram in grams {
                *corpus_frequency.entry(gram).or_insert(0) += 1;
            }
        }

        let max_count = ((self.config.max_df * n as f64).floor() as usize).max(1);
        let mut kept: Vec<(&String, usize)> = document_frequency
            .iter()
            .filter(|&(_, &df)| df >= self.config.min_df && df <= max_count)
            .map(|(term, &df)| (term, df))
            .collect();

        if kept.len() > self.config.max_features {
            // Highest corpus frequency first, ties in term order.
            kept.sort_by(|(a, _), (b, _)| {
                let fa = corpus_frequency.get(*a).copied().unwrap_or(0);
                let fb = corpus_frequency.get(*b).copied().unwrap_or(0);
                fb.cmp(&fa).then_with(|| a.cmp(b))
            });
            kept.truncate(self.config.max_features);
            kept.sort_by(|(a, _), (b, _)| a.cmp(b));
        }

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (idx, (term, df)) in kept.into_iter().enumerate() {
            vocabulary.insert(term.clone(), idx);
            // IDF = ln((N + 1) / (df + 1)) + 1
            idf.push(((n as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
        }

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n;

        Ok(())
    }

    /// Transform a document into a unit-length TF-IDF vector. Terms outside
    /// the vocabulary are ignored; an unfitted vectorizer yields the zero
    /// vector.
    pub fn transform(&self, document: &str) -> Result<SparseVector> {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for gram in self.ngrams(document)? {
            if let Some(&idx) = self.vocabulary.get(&gram) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(idx, count)| {
                let tf = if self.config.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                (idx, tf * self.idf[idx])
            })
            .collect();

        let mut vector = SparseVector::from_entries(entries);
        vector.normalize();
        Ok(vector)
    }

    /// Analyzed terms joined into n-grams of every configured length.
    fn ngrams(&self, text: &str) -> Result<Vec<String>> {
        let terms = self.analyzer.terms(text)?;
        let mut grams = Vec::new();
        for n in self.config.ngram_min..=self.config.ngram_max {
            if n == 0 || n > terms.len() {
                continue;
            }
            for window in terms.windows(n) {
                grams.push(window.join(" "));
            }
        }
        Ok(grams)
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Dimension of a term, if it is in the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.term_index(term).map(|idx| self.idf[idx])
    }

    /// Vocabulary terms in dimension order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }
}
