//! Random encounter source for headless runs.
//!
//! Without a spatial front-end nobody reports who met whom, so the engine
//! draws a fixed number of random pairs from the live population before
//! each tick. The draw uses its own seeded RNG, so a headless run is as
//! reproducible as the simulation itself.

use commons_core::EncounterSource;
use commons_types::AgentId;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Reports `pairs_per_tick` uniformly random pairs of distinct live agents.
#[derive(Debug, Clone)]
pub struct RandomEncounters {
    rng: ChaCha8Rng,
    pairs_per_tick: u32,
}

impl RandomEncounters {
    /// Create a source with its own seed.
    pub fn new(seed: u64, pairs_per_tick: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            pairs_per_tick,
        }
    }
}

impl EncounterSource for RandomEncounters {
    fn collect_encounters(&mut self, _tick: u64, live: &[AgentId]) -> Vec<(AgentId, AgentId)> {
        if live.len() < 2 {
            return Vec::new();
        }
        let mut pairs = Vec::new();
        for _ in 0..self.pairs_per_tick {
            let first = self.rng.random_range(0..live.len());
            let second = self.rng.random_range(0..live.len());
            if first == second {
                continue;
            }
            if let (Some(a), Some(b)) = (live.get(first), live.get(second)) {
                pairs.push((*a, *b));
            }
        }
        pairs
    }
}
