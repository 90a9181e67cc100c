//! Extracted query features.

use serde::{Deserialize, Serialize};

/// Structured, immutable view of a free-text interest query.
///
/// Every list is ordered by first appearance and free of duplicates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryFeatures {
    /// The raw query text.
    pub original: String,
    /// Lowercased text with collapsed whitespace.
    pub normalized: String,
    /// Lemmas of content words.
    pub keywords: Vec<String>,
    /// Named-entity spans.
    pub entities: Vec<String>,
    /// Multi-word noun phrases.
    pub phrases: Vec<String>,
    /// Terms contributed by the domain synonym table.
    pub important_terms: Vec<String>,
    /// Structurally relevant entity spans and their lowercase labels.
    pub domain_entities: Vec<String>,
    /// Objects of interest-signaling phrases ("care about ...").
    pub context: Vec<String>,
    /// Union of every class above.
    pub expanded: Vec<String>,
    /// Set when the linguistic analyzer was unavailable.
    #[serde(default)]
    pub degraded: bool,
}

impl QueryFeatures {
    /// Term classes in union order, paired with their names.
    pub fn term_classes(&self) -> [(TermClass, &[String]); 6] {
        [
            (TermClass::Keyword, self.keywords.as_slice()),
            (TermClass::Entity, self.entities.as_slice()),
            (TermClass::Phrase, self.phrases.as_slice()),
            (TermClass::Important, self.important_terms.as_slice()),
            (TermClass::DomainEntity, self.domain_entities.as_slice()),
            (TermClass::Context, self.context.as_slice()),
        ]
    }

    /// Whether the query carries domain-specific (synonym table) terms.
    pub fn has_domain_terms(&self) -> bool {
        !self.important_terms.is_empty()
    }

    /// Whether no term of any class was extracted.
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    /// Rebuild `expanded` from the term classes.
    pub(crate) fn rebuild_expanded(&mut self) {
        let mut expanded = Vec::new();
        for (_, terms) in self.term_classes() {
            for term in terms {
                push_unique(&mut expanded, term);
            }
        }
        self.expanded = expanded;
    }
}

/// The class a query term was extracted as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermClass {
    Keyword,
    Entity,
    Phrase,
    Important,
    DomainEntity,
    Context,
}

/// Collapse whitespace runs and lowercase.
pub fn normalize_query(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Append `term` unless it is empty or already present.
pub(crate) fn push_unique(list: &mut Vec<String>, term: &str) {
    let term = term.trim();
    if !term.is_empty() && !list.iter().any(|t| t == term) {
        list.push(term.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  Clean   WATER\tfor\nAll "), "clean water for all");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn test_rebuild_expanded_dedupes_in_order() {
        let mut features = QueryFeatures {
            keywords: vec!["animal".into(), "help".into()],
            entities: vec!["kenya".into()],
            important_terms: vec!["wildlife".into(), "animal".into()],
            domain_entities: vec!["kenya".into(), "gpe".into()],
            ..Default::default()
        };
        features.rebuild_expanded();

        assert_eq!(features.expanded, vec!["animal", "help", "kenya", "wildlife", "gpe"]);
        assert!(features.has_domain_terms());
        assert!(!features.is_empty());
    }

    #[test]
    fn test_push_unique() {
        let mut list = Vec::new();
        push_unique(&mut list, "water");
        push_unique(&mut list, " water ");
        push_unique(&mut list, "");
        assert_eq!(list, vec!["water"]);
    }
}
