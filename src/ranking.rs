//! Score fusion and ranking.
//!
//! ```text
//! candidates → backfill → classify → fuse → boosts → jitter → sort
//!            → diversify → dedupe by name → top N
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{Entity, EntityId};

pub mod classify;
pub mod diversify;
pub mod entropy;
pub mod fusion;
pub mod ranker;

pub use classify::{Classification, classify};
pub use diversify::{dedupe_by_name, diversify};
pub use entropy::EntropySource;
pub use fusion::{FusionWeights, is_veteran_text};
pub use ranker::{RankRequest, Ranker};

/// Which scoring path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Description,
    Category,
    Both,
    Fallback,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Description => "description",
            MatchType::Category => "category",
            MatchType::Both => "both",
            MatchType::Fallback => "fallback",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Final score: finite and non-negative.
    pub relevance_score: f64,
    pub match_type: MatchType,
    /// The larger of the semantic and category scores.
    pub match_strength: f64,
    pub semantic_score: f64,
    pub category_score: f64,
    pub external_score: f64,
    /// Names of the boosts that were applied.
    #[serde(default)]
    pub boosts: Vec<String>,
}

impl MatchResult {
    /// A result carrying the entity's fields and zeroed scores.
    pub fn for_entity(entity: &Entity, match_type: MatchType) -> Self {
        MatchResult {
            id: entity.id,
            name: entity.name.clone(),
            description: entity.description.clone(),
            categories: entity.categories.clone(),
            website: entity.website.clone(),
            relevance_score: 0.0,
            match_type,
            match_strength: 0.0,
            semantic_score: 0.0,
            category_score: 0.0,
            external_score: 0.0,
            boosts: Vec::new(),
        }
    }
}

/// Sort by relevance descending, ties by id ascending.
pub fn sort_ranked(results: &mut [MatchResult]) {
    results.sort_by(|a, b| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_type_serde() {
        assert_eq!(serde_json::to_string(&MatchType::Both).unwrap(), "\"both\"");
        assert_eq!(MatchType::Fallback.to_string(), "fallback");
    }

    #[test]
    fn test_sort_ranked() {
        let entity = |id| Entity::new(id, format!("E{id}"));
        let mut results: Vec<MatchResult> = [(3, 0.5), (1, 0.5), (2, 0.9)]
            .into_iter()
            .map(|(id, score)| MatchResult {
                relevance_score: score,
                ..MatchResult::for_entity(&entity(id), MatchType::Both)
            })
            .collect();
        sort_ranked(&mut results);
        let ids: Vec<EntityId> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
