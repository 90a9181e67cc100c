//! The recommender.
//!
//! ```text
//! query → extract (cached) → semantic scores ┐
//!                          → category scores ┴→ rank → results
//! ```
//!
//! Both indexes are built once in [`Recommender::new`] and never change.
//! The query cache and the random generator are the only mutable state.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::analysis::linguistic::{LexiconAnalyzer, LinguisticAnalyzer};
use crate::catalog::{CORPUS_FORMAT_VERSION, Catalog};
use crate::category::{CategoryIndex, CategoryMatcher};
use crate::config::EngineConfig;
use crate::error::{AlmonerError, Result};
use crate::features::{CacheStats, DomainSynonyms, QueryCache, QueryFeatureExtractor, QueryFeatures};
use crate::ranking::{EntropySource, MatchResult, MatchType, RankRequest, Ranker};
use crate::relevance::{NoModel, RelevanceModel};
use crate::vector::{CatalogIndex, SemanticScorer};

/// Health summary of a loaded recommender.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub catalog_size: usize,
    pub vocabulary_size: usize,
    pub category_count: usize,
    pub corpus_format_version: u32,
    pub cache: CacheStats,
    pub model: &'static str,
    pub model_available: bool,
    pub analyzer: Option<&'static str>,
    pub loaded_at: DateTime<Utc>,
}

/// Matches free-text interests against the catalog.
pub struct Recommender {
    catalog: Arc<Catalog>,
    catalog_index: CatalogIndex,
    category_index: CategoryIndex,
    extractor: QueryFeatureExtractor,
    cache: Arc<QueryCache>,
    model: Arc<dyn RelevanceModel>,
    semantic: SemanticScorer,
    matcher: CategoryMatcher,
    ranker: Ranker,
    rng: Mutex<StdRng>,
    config: EngineConfig,
    loaded_at: DateTime<Utc>,
}

impl std::fmt::Debug for Recommender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recommender")
            .field("catalog_size", &self.catalog.len())
            .field("vocabulary_size", &self.catalog_index.vocabulary_size())
            .field("categories", &self.category_index.len())
            .field("extractor", &self.extractor)
            .field("model", &self.model.name())
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

impl Recommender {
    /// Validate the configuration and build both indexes.
    ///
    /// Defaults: the bundled lexicon analyzer, the built-in synonym table,
    /// no relevance model, a generator seeded from `ranking.seed` and a fresh
    /// cache.
    pub fn new(catalog: Catalog, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let start = Instant::now();

        let catalog_index = CatalogIndex::build(&catalog, &config.vectorizer)?;
        let category_index = CategoryIndex::build(&catalog);
        let analyzer: Arc<dyn LinguisticAnalyzer> = Arc::new(LexiconAnalyzer::new());

        let recommender = Recommender {
            catalog: Arc::new(catalog),
            catalog_index,
            category_index,
            extractor: QueryFeatureExtractor::new(Some(analyzer)),
            cache: Arc::new(QueryCache::from_config(&config.cache)),
            model: Arc::new(NoModel),
            semantic: SemanticScorer::new(config.semantic.clone()),
            matcher: CategoryMatcher::new(config.category.clone()),
            ranker: Ranker::new(config.ranking.clone()),
            rng: Mutex::new(EntropySource::Seeded(config.ranking.seed).rng()),
            config,
            loaded_at: Utc::now(),
        };

        info!(
            "recommender ready: {} entities, {} terms, {} categories in {:?}",
            recommender.catalog.len(),
            recommender.catalog_index.vocabulary_size(),
            recommender.category_index.len(),
            start.elapsed()
        );
        Ok(recommender)
    }

    /// Replace the linguistic analyzer; `None` runs extraction degraded.
    pub fn with_analyzer(mut self, analyzer: Option<Arc<dyn LinguisticAnalyzer>>) -> Self {
        if analyzer.is_none() {
            warn!("no linguistic analyzer configured, query extraction runs degraded");
        }
        let synonyms = self.extractor.synonyms().clone();
        self.extractor = QueryFeatureExtractor::new(analyzer).with_synonyms(synonyms);
        self.cache.clear();
        self
    }

    pub fn with_synonyms(mut self, synonyms: DomainSynonyms) -> Self {
        self.extractor = self.extractor.with_synonyms(synonyms);
        self.cache.clear();
        self
    }

    pub fn with_model(mut self, model: Arc<dyn RelevanceModel>) -> Self {
        self.model = model;
        self
    }

    pub fn with_entropy(self, entropy: EntropySource) -> Self {
        *self.rng.lock() = entropy.rng();
        self
    }

    /// Share an existing cache.
    pub fn with_cache(mut self, cache: Arc<QueryCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Recommend for the configured default user.
    pub fn recommend(&self, query: &str, top_n: usize, randomize: bool) -> Result<Vec<MatchResult>> {
        self.recommend_for_user(self.config.ranking.default_user_id, query, top_n, randomize)
    }

    /// Rank catalog entities for a free-text interest query.
    ///
    /// Fails on a blank query or a `top_n` outside `1..=max_top_n`. Returns an
    /// empty list when nothing matches, unless `fallback_on_empty` is set.
    pub fn recommend_for_user(
        &self,
        user_id: u64,
        query: &str,
        top_n: usize,
        randomize: bool,
    ) -> Result<Vec<MatchResult>> {
        if query.trim().is_empty() {
            return Err(AlmonerError::invalid_argument("query must not be empty"));
        }
        let max_top_n = self.config.ranking.max_top_n;
        if !(1..=max_top_n).contains(&top_n) {
            return Err(AlmonerError::invalid_argument(format!(
                "top_n must be between 1 and {max_top_n}, got {top_n}"
            )));
        }

        let start = Instant::now();
        if self.catalog.is_empty() {
            return Ok(Vec::new());
        }

        let features = self.extract(query);

        let semantic = match self.semantic.score(&features, &self.catalog_index) {
            Ok(scores) => scores,
            Err(e) => {
                warn!("semantic scoring failed, ranking on categories only: {e}");
                Default::default()
            }
        };
        let category = self.matcher.score(&features, &self.category_index);

        let request = RankRequest {
            catalog: &self.catalog,
            features: &features,
            semantic: &semantic,
            category: &category,
            model: self.model.as_ref(),
            user_id,
            top_n,
        };
        let mut results = if randomize {
            let mut rng = self.rng.lock();
            self.ranker.rank(request, Some(&mut *rng))
        } else {
            self.ranker.rank(request, None)
        };

        if results.is_empty() && self.config.ranking.fallback_on_empty {
            results = self.fallback(top_n);
        }

        debug!(
            "recommend {query:?}: {} semantic, {} category matches, {} results in {:?}",
            semantic.len(),
            category.len(),
            results.len(),
            start.elapsed()
        );
        Ok(results)
    }

    /// Catalog entities in catalog order, classified `fallback`.
    fn fallback(&self, top_n: usize) -> Vec<MatchResult> {
        self.catalog
            .iter()
            .take(top_n)
            .map(|entity| MatchResult {
                external_score: self.config.ranking.neutral_external,
                ..MatchResult::for_entity(entity, MatchType::Fallback)
            })
            .collect()
    }

    /// Extract query features through the cache.
    pub fn extract(&self, query: &str) -> Arc<QueryFeatures> {
        if let Some(features) = self.cache.get(query) {
            return features;
        }
        let features = Arc::new(self.extractor.extract(query));
        self.cache.put(query, Arc::clone(&features));
        features
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            catalog_size: self.catalog.len(),
            vocabulary_size: self.catalog_index.vocabulary_size(),
            category_count: self.category_index.len(),
            corpus_format_version: CORPUS_FORMAT_VERSION,
            cache: self.cache.stats(),
            model: self.model.name(),
            model_available: self.model.is_available(),
            analyzer: self.extractor.analyzer_name(),
            loaded_at: self.loaded_at,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_index(&self) -> &CatalogIndex {
        &self.catalog_index
    }

    pub fn category_index(&self) -> &CategoryIndex {
        &self.category_index
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Entity;

    fn recommender() -> Recommender {
        let catalog = Catalog::new(vec![
            Entity::new(1, "Ocean Trust")
                .with_description("protects marine wildlife")
                .with_categories_str("environment,wildlife"),
            Entity::new(2, "City Readers")
                .with_description("literacy programs for children")
                .with_categories_str("education,children"),
        ])
        .unwrap();
        Recommender::new(catalog, EngineConfig::default())
            .unwrap()
            .with_entropy(EntropySource::Seeded(1))
    }

    #[test]
    fn test_recommender_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Recommender>();
    }

    #[test]
    fn test_input_validation() {
        let r = recommender();
        assert!(r.recommend("   ", 5, false).unwrap_err().is_input_error());
        assert!(r.recommend("water", 0, false).unwrap_err().is_input_error());
        assert!(r.recommend("water", 21, false).unwrap_err().is_input_error());
    }

    #[test]
    fn test_extract_uses_cache() {
        let r = recommender();
        let first = r.extract("I care about oceans");
        let second = r.extract("I care about oceans");
        assert!(Arc::ptr_eq(&first, &second));

        let stats = r.stats();
        assert_eq!(stats.cache.hits, 1);
        assert_eq!(stats.cache.misses, 1);
        assert_eq!(stats.catalog_size, 2);
        assert_eq!(stats.category_count, 4);
        assert_eq!(stats.model, "none");
        assert!(!stats.model_available);
        assert_eq!(stats.analyzer, Some("lexicon"));
    }

    #[test]
    fn test_fallback_on_empty() {
        let catalog = Catalog::new(vec![Entity::new(1, "A"), Entity::new(2, "B")]).unwrap();
        let mut config = EngineConfig::default();
        assert!(
            Recommender::new(catalog.clone(), config.clone())
                .unwrap()
                .recommend("spreadsheets", 5, false)
                .unwrap()
                .is_empty()
        );

        config.ranking.fallback_on_empty = true;
        let results = Recommender::new(catalog, config)
            .unwrap()
            .recommend("spreadsheets", 1, false)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 1);
        assert_eq!(results[0].match_type, MatchType::Fallback);
    }

    #[test]
    fn test_degraded_extraction() {
        let r = recommender().with_analyzer(None);
        let features = r.extract("Wildlife  Protection");
        assert!(features.degraded);
        assert_eq!(r.stats().analyzer, None);

        let results = r.recommend("wildlife", 2, false).unwrap();
        assert_eq!(results[0].id, 1);
    }

    #[test]
    fn test_default_generator_is_seeded_from_config() {
        let build = || {
            let catalog = Catalog::new(
                (1..=12)
                    .map(|id| {
                        Entity::new(id, format!("Shelter {id}"))
                            .with_description("rescues animals")
                            .with_categories_str("animal welfare")
                    })
                    .collect(),
            )
            .unwrap();
            Recommender::new(catalog, EngineConfig::default()).unwrap()
        };

        let first = build().recommend("animal rescue", 5, true).unwrap();
        let second = build().recommend("animal rescue", 5, true).unwrap();
        assert_eq!(first, second);
    }
}
