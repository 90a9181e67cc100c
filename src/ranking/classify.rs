//! Match classification.
//!
//! Both sub-scores are compared against two confidence tiers. The tier each
//! dimension clears decides the match type and a small multiplier:
//!
//! | semantic | category | type          | multiplier |
//! |----------|----------|---------------|------------|
//! | high     | high     | `both`        | 1.10       |
//! | high     | medium   | `both`        | 1.07       |
//! | medium   | medium   | `both`        | 1.05       |
//! | high     | -        | `description` | 1.05       |
//! | medium   | -        | `description` | 1.00       |
//! | -        | -        | larger wins   | 0.95       |
//!
//! The category rows mirror the description rows. Backfilled candidates are
//! always `fallback` at 0.90.

use crate::config::RankingConfig;
use crate::ranking::MatchType;

const BOTH_HIGH: f64 = 1.10;
const BOTH_MIXED: f64 = 1.07;
const BOTH_MEDIUM: f64 = 1.05;
const SINGLE_HIGH: f64 = 1.05;
const SINGLE_MEDIUM: f64 = 1.00;
const WEAK: f64 = 0.95;
const FALLBACK: f64 = 0.90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    None,
    Medium,
    High,
}

fn tier(score: f64, config: &RankingConfig) -> Tier {
    if score >= config.high_tier {
        Tier::High
    } else if score >= config.medium_tier {
        Tier::Medium
    } else {
        Tier::None
    }
}

/// A match type and its confidence multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub match_type: MatchType,
    pub multiplier: f64,
}

/// Classify a candidate by its semantic and category scores.
pub fn classify(
    semantic: f64,
    category: f64,
    backfilled: bool,
    config: &RankingConfig,
) -> Classification {
    if backfilled {
        return Classification {
            match_type: MatchType::Fallback,
            multiplier: FALLBACK,
        };
    }

    let (match_type, multiplier) = match (tier(semantic, config), tier(category, config)) {
        (Tier::High, Tier::High) => (MatchType::Both, BOTH_HIGH),
        (Tier::High, Tier::Medium) | (Tier::Medium, Tier::High) => (MatchType::Both, BOTH_MIXED),
        (Tier::Medium, Tier::Medium) => (MatchType::Both, BOTH_MEDIUM),
        (Tier::High, Tier::None) => (MatchType::Description, SINGLE_HIGH),
        (Tier::Medium, Tier::None) => (MatchType::Description, SINGLE_MEDIUM),
        (Tier::None, Tier::High) => (MatchType::Category, SINGLE_HIGH),
        (Tier::None, Tier::Medium) => (MatchType::Category, SINGLE_MEDIUM),
        (Tier::None, Tier::None) => {
            let match_type = if semantic > category {
                MatchType::Description
            } else if category > semantic {
                MatchType::Category
            } else {
                MatchType::Both
            };
            (match_type, WEAK)
        }
    };

    Classification {
        match_type,
        multiplier,
    }
}
