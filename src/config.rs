//! Engine configuration.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it changes:
//!
//! ```
//! use almoner::config::EngineConfig;
//!
//! let config: EngineConfig = serde_json::from_str(r#"{"cache": {"ttl_secs": 60}}"#).unwrap();
//! assert_eq!(config.cache.ttl_secs, 60);
//! assert_eq!(config.cache.max_size, 1000);
//! assert_eq!(config.ranking.max_top_n, 20);
//! config.validate().unwrap();
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AlmonerError, Result};

/// Top-level configuration of the recommender.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub vectorizer: VectorizerConfig,
    pub semantic: SemanticConfig,
    pub category: CategoryConfig,
    pub ranking: RankingConfig,
}

impl EngineConfig {
    /// Load and validate a JSON configuration file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AlmonerError::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        let config: EngineConfig = serde_json::from_str(&content).map_err(|e| {
            AlmonerError::config(format!(
                "Failed to parse config JSON from '{}': {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges and cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.cache.validate()?;
        self.vectorizer.validate()?;
        self.semantic.validate()?;
        self.category.validate()?;
        self.ranking.validate()
    }
}

/// Query cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
    /// Maximum number of cached queries.
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: 3600,
            max_size: 1000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(AlmonerError::config("cache.max_size must be at least 1"));
        }
        Ok(())
    }
}

/// Term weighting and vocabulary settings of the catalog vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    /// Vocabulary size bound (highest corpus frequency kept).
    pub max_features: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
    /// Use `1 + ln(tf)` instead of raw counts.
    pub sublinear_tf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        VectorizerConfig {
            min_df: 1,
            max_df: 0.9,
            max_features: 5000,
            ngram_min: 1,
            ngram_max: 3,
            sublinear_tf: true,
        }
    }
}

impl VectorizerConfig {
    fn validate(&self) -> Result<()> {
        if self.min_df == 0 {
            return Err(AlmonerError::config("vectorizer.min_df must be at least 1"));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(AlmonerError::config(format!(
                "vectorizer.max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.max_features == 0 {
            return Err(AlmonerError::config(
                "vectorizer.max_features must be at least 1",
            ));
        }
        if self.ngram_min == 0 || self.ngram_min > self.ngram_max {
            return Err(AlmonerError::config(format!(
                "invalid n-gram range ({}, {})",
                self.ngram_min, self.ngram_max
            )));
        }
        Ok(())
    }
}

/// Semantic scorer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// A representation scoring above this counts towards agreement.
    pub agreement_threshold: f64,
    /// Boost added per agreeing representation.
    pub agreement_increment: f64,
    /// Cap on the accumulated agreement boost.
    pub agreement_cap: f64,
    /// Entities below this combined score are dropped.
    pub min_score: f64,
    /// Maximum number of scored entities returned.
    pub max_results: usize,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        SemanticConfig {
            agreement_threshold: 0.01,
            agreement_increment: 0.05,
            agreement_cap: 0.30,
            min_score: 0.003,
            max_results: 25,
        }
    }
}

impl SemanticConfig {
    fn validate(&self) -> Result<()> {
        if self.agreement_cap < 0.0 || self.agreement_increment < 0.0 || self.min_score < 0.0 {
            return Err(AlmonerError::config(
                "semantic thresholds must be non-negative",
            ));
        }
        if self.max_results == 0 {
            return Err(AlmonerError::config("semantic.max_results must be at least 1"));
        }
        Ok(())
    }
}

/// Category matcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Terms shorter than this (in characters) are ignored.
    pub min_term_len: usize,
    pub keyword_weight: f64,
    pub entity_weight: f64,
    pub phrase_weight: f64,
    pub important_weight: f64,
    pub domain_entity_weight: f64,
    pub context_weight: f64,
    /// Applied to terms containing an important category name.
    pub important_multiplier: f64,
    pub exact_factor: f64,
    pub word_factor: f64,
    pub fuzzy_factor: f64,
    pub substring_factor: f64,
    pub fuzzy_min_len: usize,
    pub fuzzy_max_distance: usize,
    pub substring_min_len: usize,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        CategoryConfig {
            min_term_len: 3,
            keyword_weight: 1.0,
            entity_weight: 1.1,
            phrase_weight: 1.2,
            important_weight: 1.5,
            domain_entity_weight: 1.6,
            context_weight: 1.3,
            important_multiplier: 1.3,
            exact_factor: 1.0,
            word_factor: 0.8,
            fuzzy_factor: 0.7,
            substring_factor: 0.4,
            fuzzy_min_len: 4,
            fuzzy_max_distance: 3,
            substring_min_len: 5,
        }
    }
}

impl CategoryConfig {
    fn validate(&self) -> Result<()> {
        let weights = [
            self.keyword_weight,
            self.entity_weight,
            self.phrase_weight,
            self.important_weight,
            self.domain_entity_weight,
            self.context_weight,
            self.important_multiplier,
            self.exact_factor,
            self.word_factor,
            self.fuzzy_factor,
            self.substring_factor,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AlmonerError::config(
                "category weights must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Score fusion, classification and boost settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub external_weight: f64,
    pub semantic_weight: f64,
    pub category_weight: f64,
    /// Content signal above which `strong_shift` moves towards it.
    pub strong_signal: f64,
    pub strong_shift: f64,
    /// Content signal above which `moderate_shift` moves towards it.
    pub moderate_signal: f64,
    pub moderate_shift: f64,
    /// Moved from semantic to category when the query has domain terms.
    pub domain_shift: f64,
    pub high_tier: f64,
    pub medium_tier: f64,
    /// External score used when the model cannot answer.
    pub neutral_external: f64,
    pub backfill_min: f64,
    pub backfill_max: f64,
    /// Half-width of the multiplicative jitter in randomized mode.
    pub jitter: f64,
    pub website_boost: f64,
    pub long_description_chars: usize,
    pub long_description_boost: f64,
    pub medium_description_chars: usize,
    pub medium_description_boost: f64,
    pub many_categories: usize,
    pub many_categories_boost: f64,
    pub veteran_boost: f64,
    /// Seed of the deterministic backfill and of seeded entropy sources.
    pub seed: u64,
    /// User id passed to the relevance model by `recommend`.
    pub default_user_id: u64,
    /// Return catalog entities as `fallback` matches instead of nothing.
    pub fallback_on_empty: bool,
    pub max_top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        RankingConfig {
            external_weight: 0.25,
            semantic_weight: 0.375,
            category_weight: 0.375,
            strong_signal: 0.8,
            strong_shift: 0.15,
            moderate_signal: 0.6,
            moderate_shift: 0.10,
            domain_shift: 0.10,
            high_tier: 0.7,
            medium_tier: 0.4,
            neutral_external: 0.5,
            backfill_min: 0.1,
            backfill_max: 0.3,
            jitter: 0.05,
            website_boost: 1.08,
            long_description_chars: 300,
            long_description_boost: 1.05,
            medium_description_chars: 150,
            medium_description_boost: 1.03,
            many_categories: 3,
            many_categories_boost: 1.04,
            veteran_boost: 1.25,
            seed: 42,
            default_user_id: 1,
            fallback_on_empty: false,
            max_top_n: 20,
        }
    }
}

impl RankingConfig {
    fn validate(&self) -> Result<()> {
        let weights = [self.external_weight, self.semantic_weight, self.category_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AlmonerError::config("ranking weights must be non-negative"));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(AlmonerError::config(format!(
                "ranking weights must sum to 1, got {sum}"
            )));
        }
        if self.medium_tier > self.high_tier {
            return Err(AlmonerError::config(
                "ranking.medium_tier must not exceed ranking.high_tier",
            ));
        }
        if self.backfill_min < 0.0 || self.backfill_min > self.backfill_max {
            return Err(AlmonerError::config("invalid backfill score range"));
        }
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(AlmonerError::config("ranking.jitter must be in [0, 1)"));
        }
        if self.max_top_n == 0 {
            return Err(AlmonerError::config("ranking.max_top_n must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert_eq!(config.vectorizer.max_features, 5000);
        assert_eq!(config.semantic.max_results, 25);
        assert_eq!(config.category.important_multiplier, 1.3);
    }

    #[test]
    fn test_invalid_weights() {
        let mut config = EngineConfig::default();
        config.ranking.external_weight = 0.5;
        assert!(matches!(config.validate(), Err(AlmonerError::Config(_))));
    }

    #[test]
    fn test_invalid_vectorizer() {
        let mut config = EngineConfig::default();
        config.vectorizer.max_df = 0.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.vectorizer.ngram_min = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ranking": {{"seed": 7, "fallback_on_empty": true}}}}"#).unwrap();

        let config = EngineConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.ranking.seed, 7);
        assert!(config.ranking.fallback_on_empty);
        assert_eq!(config.ranking.semantic_weight, 0.375);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"cache": {{"max_size": 0}}}}"#).unwrap();
        assert!(EngineConfig::load_from_file(file.path()).is_err());

        assert!(EngineConfig::load_from_file("/nonexistent/almoner.json").is_err());
    }
}
