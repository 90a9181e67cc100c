//! Lexical feature extraction.
//!
//! Turns a raw interest query into [`QueryFeatures`]:
//!
//! ```text
//! raw text → normalize → linguistic analysis → keywords / phrases / entities
//!          → domain synonyms → interest cues → expanded union
//! ```
//!
//! Without a linguistic analyzer (or when it fails) the extractor degrades to
//! whitespace tokens as keywords.

use std::sync::Arc;

use log::{debug, warn};

use crate::analysis::linguistic::{LinguisticAnalyzer, ParsedText, PartOfSpeech};
use crate::features::query::{QueryFeatures, normalize_query, push_unique};
use crate::features::synonym::DomainSynonyms;

/// Entity labels whose spans also count as domain entities.
pub const STRUCTURAL_ENTITY_LABELS: &[&str] = &["ORG", "GPE", "LOC", "NORP", "EVENT", "FAC"];

/// Phrases that mark the object of a sentence as a stated interest.
pub const INTEREST_PHRASES: &[&str] = &[
    "want to help",
    "care about",
    "interested in",
    "support for",
    "donate to",
];

/// Extracts [`QueryFeatures`] from raw query text.
#[derive(Clone)]
pub struct QueryFeatureExtractor {
    analyzer: Option<Arc<dyn LinguisticAnalyzer>>,
    synonyms: Arc<DomainSynonyms>,
}

impl std::fmt::Debug for QueryFeatureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryFeatureExtractor")
            .field("analyzer", &self.analyzer.as_ref().map(|a| a.name()))
            .field("synonyms", &self.synonyms.len())
            .finish()
    }
}

impl QueryFeatureExtractor {
    /// Create an extractor using the built-in synonym table.
    pub fn new(analyzer: Option<Arc<dyn LinguisticAnalyzer>>) -> Self {
        QueryFeatureExtractor {
            analyzer,
            synonyms: Arc::new(DomainSynonyms::builtin()),
        }
    }

    /// Replace the domain synonym table.
    pub fn with_synonyms(mut self, synonyms: DomainSynonyms) -> Self {
        self.synonyms = Arc::new(synonyms);
        self
    }

    /// Whether a linguistic analyzer is configured.
    pub fn has_analyzer(&self) -> bool {
        self.analyzer.is_some()
    }

    pub fn analyzer_name(&self) -> Option<&'static str> {
        self.analyzer.as_ref().map(|a| a.name())
    }

    pub fn synonyms(&self) -> &DomainSynonyms {
        &self.synonyms
    }

    /// Extract features from raw query text.
    pub fn extract(&self, text: &str) -> QueryFeatures {
        let normalized = normalize_query(text);

        let Some(analyzer) = &self.analyzer else {
            return Self::degraded(text, normalized);
        };

        match analyzer.analyze(&normalized) {
            Ok(parsed) => self.from_parsed(text, normalized, &parsed),
            Err(e) => {
                warn!(
                    "linguistic analyzer '{}' failed, using whitespace keywords: {e}",
                    analyzer.name()
                );
                Self::degraded(text, normalized)
            }
        }
    }

    fn degraded(original: &str, normalized: String) -> QueryFeatures {
        let mut keywords = Vec::new();
        for token in normalized.split_whitespace() {
            push_unique(&mut keywords, token);
        }

        QueryFeatures {
            original: original.to_string(),
            normalized,
            expanded: keywords.clone(),
            keywords,
            degraded: true,
            ..Default::default()
        }
    }

    fn from_parsed(&self, original: &str, normalized: String, parsed: &ParsedText) -> QueryFeatures {
        let mut features = QueryFeatures {
            original: original.to_string(),
            normalized,
            ..Default::default()
        };

        for token in &parsed.tokens {
            if token.pos.is_content() && !token.is_stop {
                push_unique(&mut features.keywords, &token.lemma);
            }
        }

        for chunk in parsed.noun_chunks() {
            if chunk.len() > 1 {
                let phrase = chunk
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                push_unique(&mut features.phrases, &phrase);
            }
        }

        for span in &parsed.entities {
            push_unique(&mut features.entities, &span.text);
            if STRUCTURAL_ENTITY_LABELS.contains(&span.label.as_str()) {
                push_unique(&mut features.domain_entities, &span.text);
                push_unique(&mut features.domain_entities, &span.label.to_lowercase());
            }
        }

        for keyword in &features.keywords {
            if let Some(synonyms) = self.synonyms.get(keyword) {
                for synonym in synonyms {
                    push_unique(&mut features.important_terms, synonym);
                }
            }
        }
        for phrase in &features.phrases {
            if self.synonyms.phrase_mentions_domain_term(phrase) {
                push_unique(&mut features.important_terms, phrase);
            }
        }

        for sentence in &parsed.sentences {
            let lowered = sentence.text.to_lowercase();
            if !INTEREST_PHRASES.iter().any(|p| lowered.contains(p)) {
                continue;
            }
            for token in parsed.sentence_tokens(sentence) {
                if token.dep.is_object() && token.pos != PartOfSpeech::Pronoun {
                    push_unique(&mut features.context, &token.lemma);
                }
            }
        }

        features.rebuild_expanded();

        debug!(
            "extracted {} keywords, {} phrases, {} entities, {} important terms from {:?}",
            features.keywords.len(),
            features.phrases.len(),
            features.entities.len(),
            features.important_terms.len(),
            features.normalized
        );
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::linguistic::LexiconAnalyzer;
    use crate::error::{AlmonerError, Result};

    struct FailingAnalyzer;

    impl LinguisticAnalyzer for FailingAnalyzer {
        fn analyze(&self, _text: &str) -> Result<ParsedText> {
            Err(AlmonerError::analysis("model not loaded"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn extractor() -> QueryFeatureExtractor {
        QueryFeatureExtractor::new(Some(Arc::new(LexiconAnalyzer::new())))
    }

    #[test]
    fn test_extract_keywords_and_synonyms() {
        let features = extractor().extract("I want to help  Endangered animals");

        assert_eq!(features.original, "I want to help  Endangered animals");
        assert_eq!(features.normalized, "i want to help endangered animals");
        assert_eq!(features.keywords, vec!["want", "help", "endangered", "animal"]);
        assert_eq!(features.phrases, vec!["endangered animals"]);
        assert!(features.important_terms.contains(&"wildlife".to_string()));
        assert!(features.important_terms.contains(&"endangered animals".to_string()));
        assert_eq!(features.context, vec!["animal"]);
        assert!(!features.degraded);
    }

    #[test]
    fn test_expanded_is_ordered_union() {
        let features = extractor().extract("support for refugees in syria");

        assert_eq!(features.entities, vec!["syria"]);
        assert_eq!(features.domain_entities, vec!["syria", "gpe"]);
        assert_eq!(features.expanded[0], features.keywords[0]);

        let mut seen = std::collections::HashSet::new();
        assert!(features.expanded.iter().all(|t| seen.insert(t.clone())));
        for (_, terms) in features.term_classes() {
            assert!(terms.iter().all(|t| features.expanded.contains(t)));
        }
    }

    #[test]
    fn test_degraded_without_analyzer() {
        let features = QueryFeatureExtractor::new(None).extract("Clean  water for Kids");

        assert!(features.degraded);
        assert_eq!(features.keywords, vec!["clean", "water", "for", "kids"]);
        assert_eq!(features.expanded, features.keywords);
        assert!(features.entities.is_empty());
        assert!(features.phrases.is_empty());
    }

    #[test]
    fn test_degraded_on_analyzer_error() {
        let extractor = QueryFeatureExtractor::new(Some(Arc::new(FailingAnalyzer)));
        let features = extractor.extract("ocean cleanup");

        assert!(features.degraded);
        assert_eq!(features.keywords, vec!["ocean", "cleanup"]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = extractor();
        let first = extractor.extract("I care about veterans and homeless families in texas");
        let second = extractor.extract("I care about veterans and homeless families in texas");
        assert_eq!(first, second);
    }
}
