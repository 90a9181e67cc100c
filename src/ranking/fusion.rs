//! Signal fusion and explainable boosts.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::Entity;
use crate::config::RankingConfig;
use crate::features::QueryFeatures;

static VETERAN_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"\b(veterans?|military|army|navy|marines?|soldiers?|armed forces|service members?)\b",
    )
    .ok()
});

/// Whether lowercase text mentions veterans or the military.
pub fn is_veteran_text(text: &str) -> bool {
    VETERAN_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(&text.to_lowercase()))
}

/// Weights of the external, semantic and category signals. They always sum
/// to the configured total and are never negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub external: f64,
    pub semantic: f64,
    pub category: f64,
}

impl FusionWeights {
    pub fn base(config: &RankingConfig) -> Self {
        FusionWeights {
            external: config.external_weight,
            semantic: config.semantic_weight,
            category: config.category_weight,
        }
    }

    /// Shift weight towards the strongest content signal, then from
    /// semantic to category when the query carries domain terms.
    pub fn for_signals(
        semantic: f64,
        category: f64,
        domain_terms: bool,
        config: &RankingConfig,
    ) -> Self {
        let mut weights = Self::base(config);

        let strongest = semantic.max(category);
        let shift = if strongest > config.strong_signal {
            config.strong_shift
        } else if strongest > config.moderate_signal {
            config.moderate_shift
        } else {
            0.0
        };
        if shift > 0.0 {
            if semantic >= category {
                let amount = shift.min(weights.category);
                weights.semantic += amount;
                weights.category -= amount;
            } else {
                let amount = shift.min(weights.semantic);
                weights.category += amount;
                weights.semantic -= amount;
            }
        }

        if domain_terms {
            let amount = config.domain_shift.min(weights.semantic);
            weights.semantic -= amount;
            weights.category += amount;
        }

        weights
    }

    pub fn combine(&self, external: f64, semantic: f64, category: f64) -> f64 {
        self.external * external + self.semantic * semantic + self.category * category
    }
}

/// Multiplicative boosts for an entity, with the names of those applied.
pub fn boosts(
    entity: &Entity,
    features: &QueryFeatures,
    config: &RankingConfig,
) -> (f64, Vec<String>) {
    let mut multiplier = 1.0;
    let mut applied = Vec::new();

    if entity.has_website() {
        multiplier *= config.website_boost;
        applied.push("website".to_string());
    }

    let description_len = entity.description.chars().count();
    if description_len > config.long_description_chars {
        multiplier *= config.long_description_boost;
        applied.push("long_description".to_string());
    } else if description_len > config.medium_description_chars {
        multiplier *= config.medium_description_boost;
        applied.push("medium_description".to_string());
    }

    if entity.categories.len() >= config.many_categories {
        multiplier *= config.many_categories_boost;
        applied.push("many_categories".to_string());
    }

    let veteran_query = is_veteran_text(&features.normalized)
        || features.expanded.iter().any(|term| is_veteran_text(term));
    if veteran_query && entity.categories.iter().any(|c| is_veteran_text(c)) {
        multiplier *= config.veteran_boost;
        applied.push("veteran".to_string());
    }

    (multiplier, applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(w: &FusionWeights) -> f64 {
        w.external + w.semantic + w.category
    }

    #[test]
    fn test_base_weights() {
        let config = RankingConfig::default();
        let w = FusionWeights::for_signals(0.3, 0.2, false, &config);
        assert_eq!(w, FusionWeights::base(&config));
        assert!((w.combine(1.0, 1.0, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_strong_signal_shift() {
        let config = RankingConfig::default();
        let w = FusionWeights::for_signals(0.2, 0.9, false, &config);
        assert!((w.category - 0.525).abs() < 1e-12);
        assert!((w.semantic - 0.225).abs() < 1e-12);

        let w = FusionWeights::for_signals(0.65, 0.1, false, &config);
        assert!((w.semantic - 0.475).abs() < 1e-12);
        assert!((sum(&w) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_domain_shift() {
        let config = RankingConfig::default();
        let w = FusionWeights::for_signals(0.9, 0.1, true, &config);
        // +0.15 to semantic, then 0.10 back to category
        assert!((w.semantic - 0.425).abs() < 1e-12);
        assert!((w.category - 0.325).abs() < 1e-12);
        assert!((sum(&w) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_shifts_never_go_negative() {
        let config = RankingConfig {
            external_weight: 0.9,
            semantic_weight: 0.05,
            category_weight: 0.05,
            ..Default::default()
        };
        let w = FusionWeights::for_signals(1.0, 0.0, true, &config);
        assert!(w.semantic >= 0.0 && w.category >= 0.0);
        assert!((sum(&w) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_boosts() {
        let config = RankingConfig::default();
        let entity = Entity::new(1, "Vets")
            .with_description("x".repeat(200))
            .with_categories_str("veterans,housing,health")
            .with_website("https://example.org");
        let features = QueryFeatures {
            normalized: "help military families".to_string(),
            ..Default::default()
        };

        let (multiplier, applied) = boosts(&entity, &features, &config);
        assert_eq!(
            applied,
            vec!["website", "medium_description", "many_categories", "veteran"]
        );
        assert!((multiplier - 1.08 * 1.03 * 1.04 * 1.25).abs() < 1e-12);

        let plain = Entity::new(2, "Plain");
        assert_eq!(boosts(&plain, &features, &config), (1.0, Vec::new()));
    }

    #[test]
    fn test_veteran_text() {
        assert!(is_veteran_text("Veterans"));
        assert!(is_veteran_text("support for armed forces"));
        assert!(!is_veteran_text("veterinary care"));
    }
}
