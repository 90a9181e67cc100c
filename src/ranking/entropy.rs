//! Randomness for backfill and tie-breaking.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Where the recommender's random generator is seeded from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntropySource {
    /// Reproducible sequence from a fixed seed.
    Seeded(u64),
    /// Seeded from the operating system.
    #[default]
    Os,
}

impl EntropySource {
    pub fn rng(&self) -> StdRng {
        match self {
            EntropySource::Seeded(seed) => StdRng::seed_from_u64(*seed),
            EntropySource::Os => StdRng::from_os_rng(),
        }
    }
}
