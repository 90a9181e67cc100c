//! Semantic scoring of query features against the catalog index.
//!
//! Each non-empty term class of the query is projected into the catalog
//! space on its own. An entity keeps its best cosine over those
//! representations, boosted by how many representations agree that it is
//! relevant:
//!
//! ```text
//! score = max_r cos(r, e) × (1 + min(agreeing × increment, cap))
//! ```
//!
//! Scores are clamped to `[0, 1]`.

use std::collections::BTreeMap;
use std::time::Instant;

use log::debug;

use crate::catalog::EntityId;
use crate::config::SemanticConfig;
use crate::error::Result;
use crate::features::QueryFeatures;
use crate::vector::index::CatalogIndex;

/// Name and space-joined text of one query representation.
pub type Representation = (&'static str, String);

/// The query texts projected into the catalog space, empty ones skipped.
pub fn representations(features: &QueryFeatures) -> Vec<Representation> {
    let candidates: [(&'static str, String); 7] = [
        ("expanded", features.expanded.join(" ")),
        ("keywords", features.keywords.join(" ")),
        ("original", features.original.clone()),
        ("phrases", features.phrases.join(" ")),
        ("important", features.important_terms.join(" ")),
        ("domain_entities", features.domain_entities.join(" ")),
        ("context", features.context.join(" ")),
    ];
    candidates
        .into_iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .collect()
}

/// Scores entities by vector-space similarity to the query.
#[derive(Debug, Clone, Default)]
pub struct SemanticScorer {
    config: SemanticConfig,
}

impl SemanticScorer {
    pub fn new(config: SemanticConfig) -> Self {
        SemanticScorer { config }
    }

    pub fn config(&self) -> &SemanticConfig {
        &self.config
    }

    /// Score every entity and keep the best `max_results` above `min_score`.
    pub fn score(
        &self,
        features: &QueryFeatures,
        index: &CatalogIndex,
    ) -> Result<BTreeMap<EntityId, f64>> {
        let start = Instant::now();
        if index.is_empty() {
            return Ok(BTreeMap::new());
        }

        let reps = representations(features);
        // (best similarity, agreeing representations), catalog order
        let mut accumulated: Vec<(EntityId, f64, usize)> = Vec::new();

        for (name, text) in &reps {
            let query = index.transform_query(text)?;
            if query.is_empty() {
                debug!("representation '{name}' has no terms in the catalog vocabulary");
                continue;
            }
            let similarities = index.similarities(&query);
            if accumulated.is_empty() {
                accumulated = similarities.iter().map(|&(id, _)| (id, 0.0, 0)).collect();
            }
            for (slot, (_, sim)) in accumulated.iter_mut().zip(similarities) {
                if sim > slot.1 {
                    slot.1 = sim;
                }
                if sim > self.config.agreement_threshold {
                    slot.2 += 1;
                }
            }
        }

        let mut scored: Vec<(EntityId, f64)> = accumulated
            .into_iter()
            .map(|(id, best, agreeing)| {
                let boost =
                    (agreeing as f64 * self.config.agreement_increment).min(self.config.agreement_cap);
                (id, (best * (1.0 + boost)).clamp(0.0, 1.0))
            })
            .filter(|&(_, score)| score.is_finite() && score >= self.config.min_score)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(self.config.max_results);

        debug!(
            "semantic scoring: {} representations, {} entities kept in {:?}",
            reps.len(),
            scored.len(),
            start.elapsed()
        );
        Ok(scored.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Entity};
    use crate::config::VectorizerConfig;

    fn index(entities: Vec<Entity>) -> CatalogIndex {
        CatalogIndex::build(&Catalog::new(entities).unwrap(), &VectorizerConfig::default()).unwrap()
    }

    fn index_with(entities: Vec<Entity>, config: VectorizerConfig) -> CatalogIndex {
        CatalogIndex::build(&Catalog::new(entities).unwrap(), &config).unwrap()
    }

    fn features(terms: &[&str]) -> QueryFeatures {
        let mut features = QueryFeatures {
            original: terms.join(" "),
            keywords: terms.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        };
        features.rebuild_expanded();
        features
    }

    #[test]
    fn test_representations_skip_empty() {
        let reps = representations(&features(&["ocean"]));
        let names: Vec<&str> = reps.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["expanded", "keywords", "original"]);
    }

    #[test]
    fn test_self_similarity() {
        let index = index(vec![
            Entity::new(1, "A").with_description("coral reef restoration"),
            Entity::new(2, "B").with_description("school meals program"),
            Entity::new(3, "C").with_description("rural broadband access"),
        ]);
        let scores = SemanticScorer::default()
            .score(&features(&["coral", "reef", "restoration"]), &index)
            .unwrap();

        assert!((scores[&1] - 1.0).abs() < 1e-9);
        assert!(!scores.contains_key(&2));
    }

    #[test]
    fn test_agreement_boost() {
        let index = index(vec![
            Entity::new(1, "A").with_description("coral reef restoration and ocean science"),
            Entity::new(2, "B").with_description("school meals program"),
            Entity::new(3, "C").with_description("rural broadband access"),
        ]);
        let query = features(&["coral"]);
        let scorer = SemanticScorer::default();
        let scores = scorer.score(&query, &index).unwrap();

        let cosine = index
            .similarities(&index.transform_query("coral").unwrap())
            .into_iter()
            .find(|&(id, _)| id == 1)
            .unwrap()
            .1;
        // expanded, keywords and original all agree
        assert!((scores[&1] - cosine * 1.15).abs() < 1e-9);
    }

    #[test]
    fn test_agreement_boost_is_capped() {
        let index = index(vec![
            Entity::new(1, "A").with_description("coral reef restoration and ocean science"),
            Entity::new(2, "B").with_description("school meals program"),
            Entity::new(3, "C").with_description("rural broadband access"),
        ]);
        let coral = vec!["coral".to_string()];
        let mut query = QueryFeatures {
            phrases: coral.clone(),
            important_terms: coral.clone(),
            domain_entities: coral.clone(),
            context: coral,
            ..features(&["coral"])
        };
        query.rebuild_expanded();
        assert_eq!(representations(&query).len(), 7);

        let scores = SemanticScorer::default().score(&query, &index).unwrap();
        let cosine = index
            .similarities(&index.transform_query("coral").unwrap())
            .into_iter()
            .find(|&(id, _)| id == 1)
            .unwrap()
            .1;
        // seven agreeing representations would give +35%, the cap holds it at +30%
        assert!(cosine * 1.3 < 1.0);
        assert!((scores[&1] - cosine * 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_max_results_and_ties() {
        let entities: Vec<Entity> = (0..40)
            .map(|i| Entity::new(i, format!("E{i}")).with_description(format!("water unique{i}")))
            .collect();
        // every entity mentions water, so keep terms present everywhere
        let index = index_with(
            entities,
            VectorizerConfig {
                max_df: 1.0,
                ..Default::default()
            },
        );
        let config = SemanticConfig {
            max_results: 5,
            ..Default::default()
        };
        let scores = SemanticScorer::new(config)
            .score(&features(&["water"]), &index)
            .unwrap();

        // identical scores: the lowest ids win
        assert_eq!(scores.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_no_overlap_is_empty() {
        let index = index(vec![Entity::new(1, "A").with_description("coral reef")]);
        let scores = SemanticScorer::default()
            .score(&features(&["spreadsheet"]), &index)
            .unwrap();
        assert!(scores.is_empty());
    }
}
