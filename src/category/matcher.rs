//! Category matching.
//!
//! Every query term is weighted by the class it was extracted as and
//! compared against each category label through four tiers:
//!
//! | tier      | condition                                   | contribution           |
//! |-----------|---------------------------------------------|------------------------|
//! | exact     | label equals the term                       | `w × exact`            |
//! | word      | term occurs in the label on word boundaries | `w × word`             |
//! | fuzzy     | label within `min(3, len / 3)` edits        | `w × fuzzy × (1 - d / (len + 1))` |
//! | substring | term and label overlap as plain substrings  | `w × substring`        |
//!
//! A label scores in at most one of the exact and word tiers. Fuzzy matching
//! skips labels already matched by those two; substring matching skips them
//! as well. Per-entity totals are compressed with `ln(1 + x)` and divided by
//! the maximum, so the best entity scores exactly 1.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Instant;

use log::{debug, warn};
use regex::Regex;

use crate::catalog::EntityId;
use crate::category::index::CategoryIndex;
use crate::config::CategoryConfig;
use crate::features::{QueryFeatures, TermClass};
use crate::util::levenshtein::{edit_similarity, levenshtein_distance_threshold};

/// Category names whose presence in a term raises its weight.
pub const IMPORTANT_CATEGORIES: &[&str] = &[
    "education",
    "health",
    "environment",
    "poverty",
    "children",
    "animal",
    "disaster",
    "humanitarian",
    "rights",
    "community",
    "development",
    "research",
    "medical",
    "relief",
    "support",
    "aid",
    "assistance",
    "care",
];

/// Scores entities by how well their category labels match the query terms.
#[derive(Debug, Clone, Default)]
pub struct CategoryMatcher {
    config: CategoryConfig,
}

impl CategoryMatcher {
    pub fn new(config: CategoryConfig) -> Self {
        CategoryMatcher { config }
    }

    pub fn config(&self) -> &CategoryConfig {
        &self.config
    }

    fn class_weight(&self, class: TermClass) -> f64 {
        match class {
            TermClass::Keyword => self.config.keyword_weight,
            TermClass::Entity => self.config.entity_weight,
            TermClass::Phrase => self.config.phrase_weight,
            TermClass::Important => self.config.important_weight,
            TermClass::DomainEntity => self.config.domain_entity_weight,
            TermClass::Context => self.config.context_weight,
        }
    }

    /// Every eligible query term with its weight. A term extracted in
    /// several classes keeps the largest class weight.
    pub fn weighted_terms(&self, features: &QueryFeatures) -> BTreeMap<String, f64> {
        let mut weighted: BTreeMap<String, f64> = BTreeMap::new();
        for (class, terms) in features.term_classes() {
            let base = self.class_weight(class);
            for term in terms {
                let term = term.trim().to_lowercase();
                if term.chars().count() < self.config.min_term_len {
                    continue;
                }
                let mut weight = base;
                if IMPORTANT_CATEGORIES.iter().any(|c| term.contains(c)) {
                    weight *= self.config.important_multiplier;
                }
                let slot = weighted.entry(term).or_insert(weight);
                if weight > *slot {
                    *slot = weight;
                }
            }
        }
        weighted
    }

    /// Normalized category scores; empty when no term matches any label.
    pub fn score(&self, features: &QueryFeatures, index: &CategoryIndex) -> BTreeMap<EntityId, f64> {
        let start = Instant::now();
        let terms = self.weighted_terms(features);
        let mut raw: BTreeMap<EntityId, f64> = BTreeMap::new();

        for (term, weight) in &terms {
            self.score_term(term, *weight, index, &mut raw);
        }

        let scores = normalize(raw);
        debug!(
            "category matching: {} terms, {} entities matched in {:?}",
            terms.len(),
            scores.len(),
            start.elapsed()
        );
        scores
    }

    fn score_term(
        &self,
        term: &str,
        weight: f64,
        index: &CategoryIndex,
        raw: &mut BTreeMap<EntityId, f64>,
    ) {
        let term_len = term.chars().count();
        let word_pattern = match Regex::new(&format!(r"\b{}\b", regex::escape(term))) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!("skipping word matching for term {term:?}: {e}");
                None
            }
        };

        let mut matched: HashSet<&str> = HashSet::new();

        for (label, ids) in index.iter() {
            let factor = if label == term {
                self.config.exact_factor
            } else if word_pattern.as_ref().is_some_and(|p| p.is_match(label)) {
                self.config.word_factor
            } else {
                continue;
            };
            matched.insert(label);
            add(raw, ids, weight * factor);
        }

        if term_len >= self.config.fuzzy_min_len {
            let max_distance = self.config.fuzzy_max_distance.min(term_len / 3);
            if max_distance > 0 {
                for (label, ids) in index.iter() {
                    if matched.contains(label) {
                        continue;
                    }
                    if let Some(distance) = levenshtein_distance_threshold(term, label, max_distance)
                        && distance > 0
                    {
                        let similarity = edit_similarity(distance, term_len);
                        add(raw, ids, weight * self.config.fuzzy_factor * similarity);
                    }
                }
            }
        }

        if term_len >= self.config.substring_min_len {
            for (label, ids) in index.iter() {
                if matched.contains(label) {
                    continue;
                }
                let overlaps = label.contains(term)
                    || (label.chars().count() >= self.config.substring_min_len
                        && term.contains(label));
                if overlaps {
                    add(raw, ids, weight * self.config.substring_factor);
                }
            }
        }
    }
}

fn add(raw: &mut BTreeMap<EntityId, f64>, ids: &BTreeSet<EntityId>, amount: f64) {
    if amount <= 0.0 || !amount.is_finite() {
        return;
    }
    for id in ids {
        *raw.entry(*id).or_insert(0.0) += amount;
    }
}

/// `ln(1 + x)` then division by the maximum.
fn normalize(raw: BTreeMap<EntityId, f64>) -> BTreeMap<EntityId, f64> {
    let compressed: BTreeMap<EntityId, f64> =
        raw.into_iter().map(|(id, score)| (id, score.ln_1p())).collect();
    let max = compressed.values().copied().fold(0.0, f64::max);
    let denominator = if max > 0.0 { max } else { 1.0 };
    compressed
        .into_iter()
        .map(|(id, score)| (id, (score / denominator).clamp(0.0, 1.0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Entity};

    fn index() -> CategoryIndex {
        CategoryIndex::build(
            &Catalog::new(vec![
                Entity::new(1, "Ocean Trust").with_categories_str("environment,wildlife"),
                Entity::new(2, "City Readers").with_categories_str("education,children"),
                Entity::new(3, "Shelter Now").with_categories_str("animal welfare"),
                Entity::new(4, "Vets First").with_categories_str("veterans,military families"),
            ])
            .unwrap(),
        )
    }

    fn keywords(terms: &[&str]) -> QueryFeatures {
        let mut features = QueryFeatures {
            keywords: terms.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        };
        features.rebuild_expanded();
        features
    }

    #[test]
    fn test_weighted_terms() {
        let mut features = keywords(&["wildlife", "go", "health"]);
        features.important_terms = vec!["wildlife".to_string()];
        let weights = CategoryMatcher::default().weighted_terms(&features);

        assert_eq!(weights["wildlife"], 1.5);
        // important category name inside the term
        assert!((weights["health"] - 1.3).abs() < 1e-12);
        assert!(!weights.contains_key("go"));
    }

    #[test]
    fn test_exact_match_normalized_to_one() {
        let scores = CategoryMatcher::default().score(&keywords(&["wildlife"]), &index());
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[&1], 1.0);
    }

    #[test]
    fn test_word_match_inside_label() {
        let scores = CategoryMatcher::default().score(&keywords(&["welfare"]), &index());
        assert_eq!(scores.keys().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_fuzzy_match() {
        let matcher = CategoryMatcher::default();
        let scores = matcher.score(&keywords(&["enviroment", "wildlife"]), &index());
        assert!(scores.contains_key(&1));

        let fuzzy_only = matcher.score(&keywords(&["educaton"]), &index());
        assert_eq!(fuzzy_only.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_substring_match() {
        // "veteran" is not a whole word of "veterans"
        let scores = CategoryMatcher::default().score(&keywords(&["veteran"]), &index());
        assert!(scores.contains_key(&4));
    }

    #[test]
    fn test_scores_in_unit_range() {
        let scores = CategoryMatcher::default().score(
            &keywords(&["wildlife", "environment", "children", "animal"]),
            &index(),
        );
        assert!(scores.values().all(|s| (0.0..=1.0).contains(s)));
        assert!(scores.values().any(|s| *s == 1.0));
    }

    #[test]
    fn test_no_match_is_empty() {
        let matcher = CategoryMatcher::default();
        assert!(matcher.score(&keywords(&["spreadsheet"]), &index()).is_empty());
        assert!(matcher.score(&QueryFeatures::default(), &index()).is_empty());
    }
}
