//! The ranker: candidates in, top-N results out.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::catalog::{Catalog, Entity, EntityId};
use crate::config::RankingConfig;
use crate::features::QueryFeatures;
use crate::ranking::classify::classify;
use crate::ranking::diversify::{dedupe_by_name, diversify};
use crate::ranking::fusion::{FusionWeights, boosts};
use crate::ranking::{MatchResult, sort_ranked};
use crate::relevance::RelevanceModel;

/// Everything one ranking pass reads.
#[derive(Clone, Copy)]
pub struct RankRequest<'a> {
    pub catalog: &'a Catalog,
    pub features: &'a QueryFeatures,
    pub semantic: &'a BTreeMap<EntityId, f64>,
    pub category: &'a BTreeMap<EntityId, f64>,
    pub model: &'a dyn RelevanceModel,
    pub user_id: u64,
    pub top_n: usize,
}

struct Candidate {
    entity: Arc<Entity>,
    semantic: f64,
    category: f64,
    backfilled: bool,
}

/// Fuses the three signals into ordered [`MatchResult`]s.
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    config: RankingConfig,
}

impl Ranker {
    pub fn new(config: RankingConfig) -> Self {
        Ranker { config }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Rank the matched entities of a query.
    ///
    /// With `jitter_rng` set, backfill draws from it and every score is
    /// perturbed by up to `±jitter`. Without it the ranking is a pure
    /// function of the inputs. No matched entity means no results.
    pub fn rank(&self, request: RankRequest<'_>, jitter_rng: Option<&mut StdRng>) -> Vec<MatchResult> {
        let start = Instant::now();
        let top_n = request.top_n;
        if top_n == 0 {
            return Vec::new();
        }

        let mut candidates = self.matched_candidates(&request);
        if candidates.is_empty() {
            debug!("no entity matched the query");
            return Vec::new();
        }
        let matched = candidates.len();

        let randomize = jitter_rng.is_some();
        let mut seeded = StdRng::seed_from_u64(self.config.seed);
        let rng: &mut StdRng = match jitter_rng {
            Some(rng) => rng,
            None => &mut seeded,
        };

        self.backfill(&request, &mut candidates, rng);

        let mut failures = 0usize;
        let mut first_failure = None;
        let mut results: Vec<MatchResult> = candidates
            .iter()
            .map(|candidate| {
                let external = match request.model.score(request.user_id, candidate.entity.id) {
                    Ok(score) if score.is_finite() => score.clamp(0.0, 1.0),
                    Ok(_) => self.config.neutral_external,
                    Err(e) => {
                        failures += 1;
                        if first_failure.is_none() {
                            first_failure = Some(e);
                        }
                        self.config.neutral_external
                    }
                };
                self.score_candidate(candidate, external, request.features)
            })
            .collect();

        if failures > 0 {
            debug!(
                "external score unavailable for {failures} of {} candidates, using {}: {}",
                results.len(),
                self.config.neutral_external,
                first_failure.map(|e| e.to_string()).unwrap_or_default()
            );
        }

        if randomize {
            for result in &mut results {
                let u = rng.random_range(-self.config.jitter..=self.config.jitter);
                result.relevance_score = sanitize(result.relevance_score * (1.0 + u));
            }
        }

        sort_ranked(&mut results);
        let total = results.len();
        let results = dedupe_by_name(diversify(results, top_n), top_n);

        debug!(
            "ranked {matched} matched and {} backfilled candidates into {} results in {:?}",
            total - matched,
            results.len(),
            start.elapsed()
        );
        results
    }

    /// Entities with a non-zero semantic or category score, in catalog order.
    fn matched_candidates(&self, request: &RankRequest<'_>) -> Vec<Candidate> {
        let ids: BTreeSet<EntityId> = request
            .semantic
            .iter()
            .chain(request.category.iter())
            .filter(|(_, score)| **score > 0.0)
            .map(|(id, _)| *id)
            .collect();

        let mut positioned: Vec<(usize, EntityId)> = ids
            .into_iter()
            .filter_map(|id| request.catalog.position(id).map(|pos| (pos, id)))
            .collect();
        positioned.sort_unstable();

        positioned
            .into_iter()
            .filter_map(|(_, id)| request.catalog.get(id))
            .map(|entity| Candidate {
                semantic: score_of(request.semantic, entity.id),
                category: score_of(request.category, entity.id),
                entity: Arc::clone(entity),
                backfilled: false,
            })
            .collect()
    }

    /// Top up a thin candidate set with random catalog entities.
    fn backfill(&self, request: &RankRequest<'_>, candidates: &mut Vec<Candidate>, rng: &mut StdRng) {
        let top_n = request.top_n;
        if candidates.len() >= top_n.saturating_mul(2) {
            return;
        }

        let present: BTreeSet<EntityId> = candidates.iter().map(|c| c.entity.id).collect();
        let mut remaining: Vec<&Arc<Entity>> = request
            .catalog
            .iter()
            .filter(|e| !present.contains(&e.id))
            .collect();
        remaining.shuffle(rng);

        let wanted = top_n.saturating_mul(3).saturating_sub(candidates.len());
        for entity in remaining.into_iter().take(wanted) {
            candidates.push(Candidate {
                entity: Arc::clone(entity),
                semantic: rng.random_range(self.config.backfill_min..=self.config.backfill_max),
                category: rng.random_range(self.config.backfill_min..=self.config.backfill_max),
                backfilled: true,
            });
        }
    }

    fn score_candidate(&self, candidate: &Candidate, external: f64, features: &QueryFeatures) -> MatchResult {
        let entity = &candidate.entity;
        let (semantic, category) = (candidate.semantic, candidate.category);

        let classification = classify(semantic, category, candidate.backfilled, &self.config);
        let weights =
            FusionWeights::for_signals(semantic, category, features.has_domain_terms(), &self.config);
        let (boost, applied) = boosts(entity, features, &self.config);

        let relevance =
            sanitize(weights.combine(external, semantic, category) * classification.multiplier * boost);

        MatchResult {
            relevance_score: relevance,
            match_strength: semantic.max(category),
            semantic_score: semantic,
            category_score: category,
            external_score: external,
            boosts: applied,
            ..MatchResult::for_entity(entity, classification.match_type)
        }
    }
}

fn score_of(scores: &BTreeMap<EntityId, f64>, id: EntityId) -> f64 {
    scores.get(&id).copied().filter(|s| s.is_finite()).unwrap_or(0.0)
}

/// Non-finite and negative scores become zero.
fn sanitize(score: f64) -> f64 {
    if score.is_finite() { score.max(0.0) } else { 0.0 }
}
