//! Result-set filters applied after sorting.
//!
//! Two independent passes run in a fixed order: [`diversify`] first, then
//! [`dedupe_by_name`]. Each is idempotent.

use std::collections::HashSet;

use log::debug;

use crate::ranking::{MatchResult, MatchType, sort_ranked};

/// When the top `top_n` results all share one match type, swap the lowest of
/// them for the best-ranked results of another type.
///
/// Up to `max(1, top_n / 4)` entries are swapped. Backfilled results are never
/// pulled in. Returns the full list with the new top section re-sorted ahead
/// of the re-sorted remainder.
pub fn diversify(mut ranked: Vec<MatchResult>, top_n: usize) -> Vec<MatchResult> {
    if top_n == 0 || ranked.len() <= top_n {
        return ranked;
    }

    let first = ranked[0].match_type;
    if ranked[..top_n].iter().any(|r| r.match_type != first) {
        return ranked;
    }

    let alternatives: Vec<usize> = (top_n..ranked.len())
        .filter(|&i| ranked[i].match_type != first && ranked[i].match_type != MatchType::Fallback)
        .collect();
    let swaps = (top_n / 4).max(1).min(alternatives.len());
    if swaps == 0 {
        return ranked;
    }

    for (k, &alt) in alternatives[..swaps].iter().enumerate() {
        ranked.swap(top_n - 1 - k, alt);
    }
    debug!("diversified top {top_n}: swapped in {swaps} non-{first} results");

    let mut rest = ranked.split_off(top_n);
    sort_ranked(&mut ranked);
    sort_ranked(&mut rest);
    ranked.extend(rest);
    ranked
}

/// Keep the first result per case-insensitive name, filling up to `top_n`
/// from further down the list.
pub fn dedupe_by_name(ranked: Vec<MatchResult>, top_n: usize) -> Vec<MatchResult> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(top_n.min(ranked.len()));
    for result in ranked {
        if kept.len() >= top_n {
            break;
        }
        if seen.insert(result.name.trim().to_lowercase()) {
            kept.push(result);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Entity;

    fn result(id: i64, name: &str, score: f64, match_type: MatchType) -> MatchResult {
        MatchResult {
            relevance_score: score,
            ..MatchResult::for_entity(&Entity::new(id, name), match_type)
        }
    }

    fn ids(results: &[MatchResult]) -> Vec<i64> {
        results.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_diversify_swaps_lowest() {
        let ranked = vec![
            result(1, "a", 0.9, MatchType::Category),
            result(2, "b", 0.8, MatchType::Category),
            result(3, "c", 0.7, MatchType::Category),
            result(4, "d", 0.6, MatchType::Category),
            result(5, "e", 0.5, MatchType::Category),
            result(6, "f", 0.4, MatchType::Fallback),
            result(7, "g", 0.3, MatchType::Description),
        ];
        let diversified = diversify(ranked, 4);

        assert_eq!(ids(&diversified), vec![1, 2, 3, 7, 4, 5, 6]);
        assert_eq!(diversified[3].match_type, MatchType::Description);
    }

    #[test]
    fn test_diversify_is_idempotent() {
        let ranked = vec![
            result(1, "a", 0.9, MatchType::Both),
            result(2, "b", 0.8, MatchType::Both),
            result(3, "c", 0.3, MatchType::Category),
        ];
        let once = diversify(ranked, 2);
        let twice = diversify(once.clone(), 2);
        assert_eq!(once, twice);
        assert_eq!(ids(&once), vec![1, 3, 2]);
    }

    #[test]
    fn test_diversify_leaves_mixed_or_short_lists() {
        let mixed = vec![
            result(1, "a", 0.9, MatchType::Both),
            result(2, "b", 0.8, MatchType::Category),
            result(3, "c", 0.3, MatchType::Description),
        ];
        assert_eq!(ids(&diversify(mixed, 2)), vec![1, 2, 3]);

        let short = vec![result(1, "a", 0.9, MatchType::Both)];
        assert_eq!(diversify(short, 3).len(), 1);
    }

    #[test]
    fn test_dedupe_backfills() {
        let ranked = vec![
            result(1, "Ocean Trust", 0.9, MatchType::Both),
            result(2, "ocean trust ", 0.8, MatchType::Both),
            result(3, "City Readers", 0.7, MatchType::Category),
            result(4, "Shelter Now", 0.6, MatchType::Category),
        ];
        let deduped = dedupe_by_name(ranked, 3);
        assert_eq!(ids(&deduped), vec![1, 3, 4]);

        let again = dedupe_by_name(deduped.clone(), 3);
        assert_eq!(again, deduped);
    }
}
